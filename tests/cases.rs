use dynamic_compose_lib::*;
use pretty_assertions_sorted::assert_eq_sorted;
use std::path::PathBuf;

const RESULT_FILE: &str = "docker-compose.result.json";
const MESSAGES_FILE: &str = "docker-compose.messages.txt";

#[test]
fn test_cases() {
    colored::control::set_override(false);

    // Each directory of tests/cases is an application folder, named after its main service
    let mut apps: Vec<PathBuf> = std::fs::read_dir("tests/cases")
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_dir())
        .collect();
    apps.sort();
    assert!(!apps.is_empty());

    for app in apps {
        let app_name = app.file_name().unwrap().to_str().unwrap();
        println!("Processing {}", app_name);

        let content = std::fs::read_to_string(app.join(COMPOSE_FILE)).unwrap();
        let translation = translate_compose_str(&content, app_name).unwrap();

        let json = generate_json_content(&translation.compose).unwrap();
        let expected = std::fs::read_to_string(app.join(RESULT_FILE)).unwrap();
        assert_eq_sorted!(json, expected);

        let messages = translation
            .messages
            .iter()
            .map(|message| format!("{}\n", message))
            .collect::<String>();
        let expected = std::fs::read_to_string(app.join(MESSAGES_FILE)).unwrap_or_default();
        assert_eq_sorted!(messages, expected);
    }
}
