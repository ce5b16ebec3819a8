//! Reversible pseudonyms, token encoding and scan-and-reverse.

use std::sync::Arc;

use pseudonym_gateway::config::decode_key;
use pseudonym_gateway::pseudonyms::hash_encoding::{decode_hash, encode_hash};
use pseudonym_gateway::pseudonyms::{
    no_canonicalization, AesReversibleStrategy, CipherSuite, DeterministicPseudonymStrategy,
    Pseudonym, PseudonymEncoder, ReversiblePseudonymStrategy, Sha256DeterministicStrategy,
    UrlSafeTokenEncoder,
};

// PBKDF2-HMAC-SHA256("secret", "salt", 65536 rounds, 32 bytes)
const TEST_KEY_B64: &str = "emh7Har2PL+s582JvLSuVGoSkuyD/831XLevfU/lYY0=";

const BLAH_CBC: &str = "p~nVPSMYD7ZO_ptGIMJ65TAFo5_vVVQQ2af5Bfg7bW0Jq9JIOXfBWhts_zA5Ns0r4m";
const BLAH_GCM: &str = "p~nVPSMYD7ZO_ptGIMJ65TAFo5_vVVQQ2af5Bfg7bW0JpFszshi2nfr3BovVcPFYct2qRdcA";

fn deterministic() -> Arc<Sha256DeterministicStrategy> {
    Arc::new(Sha256DeterministicStrategy::new("salt"))
}

fn strategy(suite: CipherSuite) -> AesReversibleStrategy {
    let key = decode_key(TEST_KEY_B64).unwrap();
    AesReversibleStrategy::new(suite, deterministic(), &key).unwrap()
}

fn token(suite: CipherSuite, identifier: &str) -> String {
    let sealed = strategy(suite)
        .seal(identifier, &no_canonicalization)
        .unwrap();
    UrlSafeTokenEncoder::new().encode(&Pseudonym::from_reversible(sealed).unwrap())
}

// ---------------------------------------------------------------------------
// Pinned encodings
// ---------------------------------------------------------------------------

#[test]
fn cbc_token_matches_reference() {
    assert_eq!(token(CipherSuite::Cbc, "blah"), BLAH_CBC);
}

#[test]
fn gcm_token_matches_reference() {
    assert_eq!(token(CipherSuite::Gcm, "blah"), BLAH_GCM);
}

#[test]
fn decoded_token_carries_deterministic_hash() {
    let encoder = UrlSafeTokenEncoder::new();
    let decoded = encoder.decode(BLAH_CBC).unwrap();

    assert_eq!(decoded.hash, deterministic().digest("blah", ""));
    assert_eq!(decoded.reversible.as_ref().unwrap().len(), 48);
    assert_eq!(encoder.encode(&decoded), BLAH_CBC);
    assert_eq!(
        strategy(CipherSuite::Cbc)
            .open(decoded.reversible.as_ref().unwrap())
            .unwrap(),
        "blah"
    );
}

#[test]
fn hash_string_uses_substituted_alphabet() {
    let hash = deterministic().digest("alice@worklytics.co", "");
    let encoded = encode_hash(&hash);
    assert_eq!(encoded, "Qf4dLJ4jfqZLn9ef4VirvYjvOnRaVI5tf5oLnM65YOA");
    assert!(!encoded.contains('/') && !encoded.contains('+') && !encoded.contains('='));
    assert_eq!(decode_hash(&encoded).unwrap(), hash);
}

// ---------------------------------------------------------------------------
// Scan-and-reverse
// ---------------------------------------------------------------------------

const TEMPLATES: &[&str] = &[
    "https://api.acme.com/v1/accounts/{}",
    "https://api.acme.com/v1/accounts/{}/calendar",
    "https://api.acme.com/v1/accounts/{}/calendar?param=blah&param2=blah2",
    "https://api.acme.com/v1/accounts?id={}",
    "https://api.acme.com/v1/accounts/{}?id={}",
    "https://api.acme.com/v1/accounts/{}?id=p~12adsfasdfasdf31",
    "https://api.acme.com/v1/accounts/p~12adsfasdfasdf31?id={}",
    "https://api.acme.com/v1/accounts",
    "",
];

#[test]
fn reverse_all_restores_templates() {
    for suite in [CipherSuite::Cbc, CipherSuite::Gcm] {
        let strategy = strategy(suite);
        let encoded = token(suite, "blah");
        let encoder = UrlSafeTokenEncoder::new();

        for template in TEMPLATES {
            let input = template.replace("{}", &encoded);
            let expected = template.replace("{}", "blah");
            assert_eq!(
                encoder.reverse_all(&input, &strategy),
                expected,
                "template {template:?} with {suite}"
            );
        }
    }
}

#[test]
fn reverse_all_leaves_hash_only_tokens() {
    let encoder = UrlSafeTokenEncoder::new();
    let hash_only = encoder.encode(&Pseudonym::from_hash(deterministic().digest("blah", "")));
    let text = format!("/accounts/{hash_only}");
    assert_eq!(
        encoder.reverse_all(&text, &strategy(CipherSuite::Cbc)),
        text
    );
}

#[test]
fn reverse_all_leaves_tokens_it_cannot_open() {
    let encoder = UrlSafeTokenEncoder::new();
    let other_key = AesReversibleStrategy::new(CipherSuite::Gcm, deterministic(), &[1u8; 32]).unwrap();

    let text = format!("/a/{BLAH_GCM}/b/{BLAH_CBC}");
    // neither token authenticates under a different GCM key
    let reversed = encoder.reverse_all(&text, &other_key);
    assert_eq!(reversed, text);
    assert_eq!(encoder.find_tokens(&reversed).len(), 2);
}

#[test]
fn strategy_is_shareable_across_threads() {
    let strategy = Arc::new(strategy(CipherSuite::Cbc));
    let encoder = UrlSafeTokenEncoder::new();

    std::thread::scope(|scope| {
        for i in 0..4 {
            let strategy = Arc::clone(&strategy);
            scope.spawn(move || {
                let id = format!("user-{i}@worklytics.co");
                let sealed = strategy.seal(&id, &no_canonicalization).unwrap();
                let token = encoder.encode(&Pseudonym::from_reversible(sealed).unwrap());
                assert_eq!(encoder.reverse_all(&token, &*strategy), id);
            });
        }
    });
}
