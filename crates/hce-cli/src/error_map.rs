use std::fmt::Display;

use hce_core::AssistantError;

fn map_error(code: &'static str, error: impl Display) -> AssistantError {
    AssistantError::new(code, error.to_string())
}

pub(crate) fn json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

pub(crate) fn emit_error(error: AssistantError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    1
}

pub(crate) fn map_tui_io(error: std::io::Error) -> AssistantError {
    map_error("TUI_IO", error)
}

pub(crate) fn map_cli_file_read(error: std::io::Error) -> AssistantError {
    map_error("CLI_FILE_READ", error)
}

pub(crate) fn map_cli_log_file(error: std::io::Error) -> AssistantError {
    map_error("CLI_LOG_FILE", error)
}

pub(crate) fn map_cli_output(error: serde_json::Error) -> AssistantError {
    map_error("CLI_OUTPUT", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(AssistantError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(map_tui_io(std::io::Error::other("io")).code, "TUI_IO");
        assert_eq!(
            map_cli_file_read(std::io::Error::other("read")).code,
            "CLI_FILE_READ"
        );
        assert_eq!(
            map_cli_log_file(std::io::Error::other("log")).code,
            "CLI_LOG_FILE"
        );

        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_output(invalid).code, "CLI_OUTPUT");
    }

    #[test]
    fn json_string_quotes_and_escapes() {
        assert_eq!(json_string("say \"hi\""), r#""say \"hi\"""#);
    }
}
