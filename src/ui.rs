use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Category description and advice for a failure caused by an rpmkit error
pub fn error_advice(err: &anyhow::Error) -> Option<(&'static str, &'static str)> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<rpmkit::Error>())
        .map(|cause| {
            let category = cause.category();
            (category.description(), category.advice())
        })
}

/// Print what went wrong and what to try, when the failure has a known category
pub fn hint(err: &anyhow::Error) {
    if let Some((description, advice)) = error_advice(err) {
        eprintln!("{} {}", "✗".red(), description.bold());
        eprintln!("  {}", advice.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use rpmkit::ErrorCategory;

    #[test]
    fn test_error_advice_sees_through_context() {
        let result: rpmkit::Result<()> = Err(rpmkit::Error::NotFound {
            identity: "bash.x86_64 0:5.2.26-3.fc40".to_string(),
        });
        let err = result.context("Cannot change mode").unwrap_err();

        let (description, advice) = error_advice(&err).unwrap();
        assert_eq!(description, ErrorCategory::NotFound.description());
        assert_eq!(advice, ErrorCategory::NotFound.advice());
    }

    #[test]
    fn test_error_advice_for_database_errors() {
        let err = anyhow::Error::from(rpmkit::Error::RpmNotFound);
        let (description, _) = error_advice(&err).unwrap();
        assert_eq!(description, "Package database unavailable");
    }

    #[test]
    fn test_error_advice_ignores_other_failures() {
        let err = anyhow::anyhow!("Could not determine home directory");
        assert!(error_advice(&err).is_none());
    }
}
