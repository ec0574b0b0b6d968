/// Readable restatement of the evaluation for the call log.
///
/// This wraps the snippet in an `evaluate` callback for display only; the
/// action evaluates `code` as given.
pub fn audit_lines(code: &str) -> Vec<String> {
    vec![
        "// Execute JavaScript code".to_string(),
        "const result = await page.evaluate(() => {".to_string(),
        format!("  {}", code),
        "});".to_string(),
        "console.log('JavaScript execution result:', result);".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_code_in_five_lines() {
        let lines = audit_lines("return 1+1");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "// Execute JavaScript code");
        assert_eq!(lines[2], "  return 1+1");
        assert_eq!(lines[4], "console.log('JavaScript execution result:', result);");
    }

    #[test]
    fn multiline_code_stays_in_one_entry() {
        let lines = audit_lines("const a = 1;\nreturn a;");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "  const a = 1;\nreturn a;");
    }
}
