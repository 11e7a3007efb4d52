//! Classify command implementation.

use super::{read_input, Session};
use crate::cli::ClassifyArgs;
use crate::error::Result;

/// Execute the classify command.
pub async fn execute_classify(args: ClassifyArgs, session: &Session) -> Result<()> {
    let text = read_input(&args.input)?;
    let extractor = session.extractor()?;

    let classification = extractor.classify(&text).await?;

    println!("{}", session.formatter.format_classification(&classification)?);
    Ok(())
}
