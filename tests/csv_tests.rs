//! CSV export sanitization against pinned fixtures.

use std::fs::File;
use std::path::PathBuf;

use pseudonym_gateway::config::{Options, Rule, Rules1};
use pseudonym_gateway::storage::{CsvFileHandler, FileHandler};
use pseudonym_gateway::Sanitizer;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/csv")
        .join(name)
}

fn handle(name: &str, rules: Rules1) -> String {
    let sanitizer = Sanitizer::new(Options::new("salt", "hris").with_rules(rules)).unwrap();
    let mut file = File::open(fixture(name)).unwrap();
    let bytes = CsvFileHandler::new().handle(&mut file, &sanitizer).unwrap();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn pseudonymizes_email_column() {
    let expected = "EMPLOYEE_ID,EMPLOYEE_EMAIL,DEPARTMENT,EFFECTIVE_ISOWEEK\r\n\
        1,\"{\"\"scope\"\":\"\"email\"\",\"\"domain\"\":\"\"worklytics.co\"\",\"\"hash\"\":\"\"Qf4dLJ4jfqZLn9ef4VirvYjvOnRaVI5tf5oLnM65YOA\"\"}\",Engineering,2020-01-06\r\n\
        2,\"{\"\"scope\"\":\"\"email\"\",\"\"domain\"\":\"\"workltyics.co\"\",\"\"hash\"\":\"\"al4JK5KlOIsneC2DM__P_HRYe28LWYTBSf3yWKGm5yQ\"\"}\",Sales,2020-01-06\r\n\
        3,\"{\"\"scope\"\":\"\"email\"\",\"\"domain\"\":\"\"workltycis.co\"\",\"\"hash\"\":\"\"BlQB8Vk0VwdbdWTGAzBF.ote1357Ajr0fFcgFf72kdk\"\"}\",Engineering,2020-01-06\r\n\
        4,,Engineering,2020-01-06\r\n";

    let out = handle(
        "hris-example.csv",
        Rules1 {
            pseudonymizations: vec![Rule::for_columns(&["EMPLOYEE_EMAIL"])],
            ..Default::default()
        },
    );
    assert_eq!(out, expected);
}

#[test]
fn redacted_column_is_dropped() {
    let expected = "EMPLOYEE_ID,EMPLOYEE_EMAIL,EFFECTIVE_ISOWEEK\r\n\
        1,\"{\"\"scope\"\":\"\"email\"\",\"\"domain\"\":\"\"worklytics.co\"\",\"\"hash\"\":\"\"Qf4dLJ4jfqZLn9ef4VirvYjvOnRaVI5tf5oLnM65YOA\"\"}\",2020-01-06\r\n\
        2,\"{\"\"scope\"\":\"\"email\"\",\"\"domain\"\":\"\"workltyics.co\"\",\"\"hash\"\":\"\"al4JK5KlOIsneC2DM__P_HRYe28LWYTBSf3yWKGm5yQ\"\"}\",2020-01-06\r\n\
        3,\"{\"\"scope\"\":\"\"email\"\",\"\"domain\"\":\"\"workltycis.co\"\",\"\"hash\"\":\"\"BlQB8Vk0VwdbdWTGAzBF.ote1357Ajr0fFcgFf72kdk\"\"}\",2020-01-06\r\n\
        4,,2020-01-06\r\n";

    let out = handle(
        "hris-example.csv",
        Rules1 {
            pseudonymizations: vec![Rule::for_columns(&["EMPLOYEE_EMAIL"])],
            redactions: vec![Rule::for_columns(&["DEPARTMENT"])],
            ..Default::default()
        },
    );
    assert_eq!(out, expected);
}

#[test]
fn headers_match_trimmed_and_case_insensitive() {
    let expected = "EMPLOYEE_ID,AN EMAIL,SOME DEPARTMENT\r\n\
        \"{\"\"scope\"\":\"\"hris\"\",\"\"hash\"\":\"\"SappwO4KZKGprqqUNruNreBD2BVR98nEM6NRCu3R2dM\"\"}\",\"{\"\"scope\"\":\"\"email\"\",\"\"domain\"\":\"\"worklytics.co\"\",\"\"hash\"\":\"\"Qf4dLJ4jfqZLn9ef4VirvYjvOnRaVI5tf5oLnM65YOA\"\"}\",Engineering\r\n";

    let out = handle(
        "hris-example-headers-w-spaces.csv",
        Rules1 {
            pseudonymizations: vec![Rule::for_columns(&["employee_id", "AN EMAIL"])],
            ..Default::default()
        },
    );
    assert_eq!(out, expected);
}

#[test]
fn quoted_cells_survive() {
    let expected = "EMPLOYEE_ID,EMAIL,DEPARTMENT\r\n\
        \"{\"\"scope\"\":\"\"hris\"\",\"\"hash\"\":\"\"SappwO4KZKGprqqUNruNreBD2BVR98nEM6NRCu3R2dM\"\"}\",\"{\"\"scope\"\":\"\"email\"\",\"\"domain\"\":\"\"worklytics.co\"\",\"\"hash\"\":\"\"Qf4dLJ4jfqZLn9ef4VirvYjvOnRaVI5tf5oLnM65YOA\"\"}\",\",,,\"\r\n";

    let out = handle(
        "hris-example-quotes.csv",
        Rules1 {
            pseudonymizations: vec![Rule::for_columns(&["EMPLOYEE_ID", "EMAIL"])],
            ..Default::default()
        },
    );
    assert_eq!(out, expected);
}
