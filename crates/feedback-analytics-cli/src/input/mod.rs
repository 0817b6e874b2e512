pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a command's JSON input from `--input <file>` or, failing that, from
/// piped stdin. `what` names the analysis for the error message.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(serde_json::from_value(value)
            .map_err(|e| format!("Invalid {} input on stdin: {}", what, e))?),
        None => Err(format!("--input <file.json> or stdin required for {}", what).into()),
    }
}
