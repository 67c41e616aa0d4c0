//! Integration tests for the CSV loader

use std::io::Write;

use serde_json::json;
use tempfile::NamedTempFile;
use text_guards::loader::LoaderError;
use text_guards::CsvLoader;

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MLB: &str = "\"Team\", \"Payroll (millions)\", \"Wins\"\n\
                   \"Nationals\", 81.34, 98\n\
                   \"Reds\", 82.20, 97\n\
                   \"Yankees\", 197.96, 95\n";

#[test]
fn test_rows_become_documents() {
    let file = csv_file(MLB);
    let docs = CsvLoader::new(file.path()).load().unwrap();

    assert_eq!(docs.len(), 3);
    assert_eq!(
        docs[0].page_content,
        "Team: Nationals\n\"Payroll (millions)\": 81.34\n\"Wins\": 98"
    );
    assert_eq!(docs[2].metadata["row"], json!(2));
    assert_eq!(
        docs[1].metadata["source"],
        json!(file.path().display().to_string())
    );
}

#[test]
fn test_plain_headers() {
    let file = csv_file("name,age\nAda,36\nAlan,41\n");
    let docs = CsvLoader::new(file.path()).load().unwrap();
    assert_eq!(docs[1].page_content, "name: Alan\nage: 41");
}

#[test]
fn test_source_column() {
    let file = csv_file("url,title\nhttps://a.example,First\nhttps://b.example,Second\n");
    let docs = CsvLoader::new(file.path()).source_column("url").load().unwrap();
    assert_eq!(docs[0].metadata["source"], json!("https://a.example"));
    assert_eq!(docs[1].metadata["source"], json!("https://b.example"));
}

#[test]
fn test_missing_source_column() {
    let file = csv_file("a,b\n1,2\n");
    let err = CsvLoader::new(file.path()).source_column("url").load().unwrap_err();
    assert!(matches!(err, LoaderError::MissingSourceColumn(col) if col == "url"));
}

#[test]
fn test_custom_delimiter_and_fieldnames() {
    let file = csv_file("Ada;36\nAlan;41\n");
    let docs = CsvLoader::new(file.path())
        .delimiter(b';')
        .fieldnames(["name", "age"])
        .load()
        .unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].page_content, "name: Ada\nage: 36");
    assert_eq!(docs[0].metadata["row"], json!(0));
}

#[test]
fn test_quoted_field_with_newline() {
    let file = csv_file("id,text\n1,\"line one\nline two\"\n");
    let docs = CsvLoader::new(file.path()).load().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].page_content, "id: 1\ntext: line one\nline two");
}
