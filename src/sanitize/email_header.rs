use mailparse::{addrparse, MailAddr};

use super::canonical::parse_email;

/// Addresses in an RFC 5322 address-list header (`To`, `Cc`, ...), in order.
///
/// Display names are dropped and group members are flattened. Returns `None`
/// when the header does not parse or any member is not a plain address.
pub fn parse_address_list(header: &str) -> Option<Vec<String>> {
    let list = addrparse(header).ok()?;

    let mut addresses = Vec::new();
    for addr in list.iter() {
        match addr {
            MailAddr::Single(single) => addresses.push(single.addr.clone()),
            MailAddr::Group(group) => {
                addresses.extend(group.addrs.iter().map(|single| single.addr.clone()))
            }
        }
    }

    if addresses.is_empty() || addresses.iter().any(|a| parse_email(a).is_none()) {
        return None;
    }
    Some(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_address() {
        assert_eq!(
            parse_address_list("alice@worklytics.co"),
            Some(vec!["alice@worklytics.co".to_string()])
        );
    }

    #[test]
    fn test_display_names_and_multiple() {
        let parsed =
            parse_address_list("Alice Example <alice@worklytics.co>, \"Smith, Bob\" <bob@worklytics.co>")
                .unwrap();
        assert_eq!(parsed, vec!["alice@worklytics.co", "bob@worklytics.co"]);
    }

    #[test]
    fn test_group_members_flattened() {
        let parsed =
            parse_address_list("team: alice@worklytics.co, bob@worklytics.co;").unwrap();
        assert_eq!(parsed, vec!["alice@worklytics.co", "bob@worklytics.co"]);
    }

    #[test]
    fn test_not_an_address_list() {
        assert_eq!(parse_address_list("just some words"), None);
    }
}
