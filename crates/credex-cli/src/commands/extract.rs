//! Extract command implementation.

use super::{read_input, Session};
use crate::cli::ExtractArgs;
use crate::error::{CliError, Result};
use credex_domain::SubCategory;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, session: &Session) -> Result<()> {
    let category = args.category.as_deref().map(parse_sub_category).transpose()?;
    let text = read_input(&args.input)?;
    let extractor = session.extractor()?;

    let result = match category {
        Some(sub) => extractor.extract_with_category(&text, sub).await?,
        None => extractor.extract(&text).await?,
    };

    println!("{}", session.formatter.format_extraction(&result)?);
    Ok(())
}

/// Parse a sub-category id given on the command line.
pub fn parse_sub_category(id: &str) -> Result<SubCategory> {
    SubCategory::parse(id).ok_or_else(|| {
        let known: Vec<&str> = SubCategory::ALL.iter().map(|s| s.as_str()).collect();
        CliError::InvalidInput(format!(
            "unknown sub-category '{}' (expected one of: {})",
            id,
            known.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sub_category() {
        assert_eq!(parse_sub_category("workServer").unwrap(), SubCategory::WorkServer);

        let err = parse_sub_category("gaming").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("gaming"));
        assert!(message.contains("digitalAI"));
    }
}
