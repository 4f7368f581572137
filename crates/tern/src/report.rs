//! Diagnostic report output.

use serde_json::{Value, json};
use tern_transpile::Diagnostics;

/// Machine-readable report.
pub fn to_json(diagnostics: &Diagnostics) -> Value {
    json!({
        "errors": diagnostics.error_count(),
        "warnings": diagnostics.warning_count(),
        "dropped": diagnostics.dropped(),
        "diagnostics": diagnostics.iter().collect::<Vec<_>>(),
    })
}

/// Print the report: JSON on stdout, or the human summary on stderr when
/// there is anything to say.
pub fn print(diagnostics: &Diagnostics, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&to_json(diagnostics))?);
    } else if diagnostics.error_count() + diagnostics.warning_count() > 0 {
        eprint!("{}", diagnostics);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.warning(3, "'end' closes if block opened with '{' at line 1");
        diagnostics.error(0, "C compiler 'cc' not found");

        let value = to_json(&diagnostics);
        assert_eq!(value["errors"], 1);
        assert_eq!(value["warnings"], 1);
        assert_eq!(value["dropped"], 0);
        assert_eq!(value["diagnostics"][0]["severity"], "warning");
        assert_eq!(value["diagnostics"][0]["line"], 3);
        assert_eq!(value["diagnostics"][1]["message"], "C compiler 'cc' not found");
    }
}
