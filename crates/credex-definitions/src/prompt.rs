//! Prompt rendering for routing and extraction
//!
//! Placeholder substitution is literal: the document text is inserted last so
//! that braces inside it are never interpreted.

use crate::error::DefinitionError;
use crate::loader::DefinitionLoader;
use crate::model::{ExtractionSchema, FieldType, Localized};
use credex_domain::{Language, MainCategory, OutputContract, SubCategory};
use std::sync::Arc;

/// Builds the three prompts of a pipeline run from the definitions
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    loader: Arc<DefinitionLoader>,
    language: Language,
}

impl PromptBuilder {
    /// Create a builder for `language`
    pub fn new(loader: Arc<DefinitionLoader>, language: Language) -> Self {
        Self { loader, language }
    }

    /// Prompt language
    pub fn language(&self) -> Language {
        self.language
    }

    /// Stage A: choose one of the main categories
    pub fn main_category_prompt(&self, text: &str) -> Result<String, DefinitionError> {
        let definition = self.loader.load_category_definition()?;
        let lang = self.language;

        let listing = definition
            .main_categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                let examples = category
                    .examples
                    .get(lang)
                    .iter()
                    .map(|ex| format!("   - {}", ex))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "{}. {}\n   {}\n   {}\n{}",
                    index + 1,
                    heading(&category.id, category.name.get(lang), lang),
                    category.description.get(lang),
                    examples_label(lang),
                    examples
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(definition
            .prompts
            .main_category_judgment
            .get(lang)
            .replace("{MAIN_CATEGORY_DEFINITIONS}", &listing)
            .replace("{TEXT}", text))
    }

    /// Stage B: choose one of the sub-categories of `main`
    pub fn sub_category_prompt(
        &self,
        main: MainCategory,
        text: &str,
    ) -> Result<String, DefinitionError> {
        let definition = self.loader.load_category_definition()?;
        let lang = self.language;
        let ids = self.loader.sub_category_ids(main)?;

        let mut entries = Vec::with_capacity(ids.len());
        for (index, sub) in ids.iter().enumerate() {
            let sub_def = self.loader.load_sub_category_definition(*sub)?;
            let examples = sub_def.examples.get(lang);
            let examples_text = if examples.is_empty() {
                String::new()
            } else {
                format!("\n   {} {}", examples_label(lang), examples.join(", "))
            };
            entries.push(format!(
                "{}. {}\n   {}{}",
                index + 1,
                heading(sub.as_str(), sub_def.name.get(lang), lang),
                sub_def.description.get(lang),
                examples_text
            ));
        }

        let main_name = definition
            .main_category(main.as_str())
            .map(|m| m.name.get(lang).clone())
            .unwrap_or_else(|| main.as_str().to_string());

        Ok(definition
            .prompts
            .sub_category_judgment
            .get(lang)
            .replace("{MAIN_CATEGORY_NAME}", &main_name)
            .replace("{SUB_CATEGORY_COUNT}", &ids.len().to_string())
            .replace("{SUB_CATEGORY_DEFINITIONS}", &entries.join("\n\n"))
            .replace("{TEXT}", text))
    }

    /// Extraction prompt for `sub`
    ///
    /// Uses the definition's explicit template when it has one, otherwise
    /// builds the prompt from the schema.
    pub fn extraction_prompt(
        &self,
        sub: SubCategory,
        text: &str,
        contract: OutputContract,
    ) -> Result<String, DefinitionError> {
        let definition = self.loader.load_sub_category_definition(sub)?;

        if let Some(template) = &definition.prompts.extraction {
            return Ok(template.get(self.language).replace("{TEXT}", text));
        }

        let schema = ExtractionSchema {
            sub_category: sub,
            fields: definition.fields.clone(),
        };
        Ok(fallback_extraction_prompt(
            &schema,
            &definition.name,
            self.language,
            contract,
            text,
        ))
    }
}

fn heading(id: &str, name: &str, lang: Language) -> String {
    match lang {
        Language::Ja => format!("**{}（{}）**", id, name),
        Language::En => format!("**{} ({})**", id, name),
    }
}

fn examples_label(lang: Language) -> &'static str {
    match lang {
        Language::Ja => "例:",
        Language::En => "Examples:",
    }
}

/// Render the schema listing shown to the model
///
/// JSON lists `"name": type | null` lines inside braces; YAML lists
/// `name: type | null` lines. Required fields drop the `| null`.
pub fn render_schema(schema: &ExtractionSchema, contract: OutputContract) -> String {
    let lines: Vec<String> = schema
        .fields
        .iter()
        .map(|field| {
            let ty = match field.field_type {
                FieldType::Integer => "integer",
                FieldType::String => "string",
            };
            let ty = if field.required {
                ty.to_string()
            } else {
                format!("{} | null", ty)
            };
            match contract {
                OutputContract::Yaml => format!("{}: {}", field.name, ty),
                _ => format!("  \"{}\": {}", field.name, ty),
            }
        })
        .collect();

    match contract {
        OutputContract::Yaml => lines.join("\n"),
        _ => format!("{{\n{}\n}}", lines.join(",\n")),
    }
}

fn fallback_extraction_prompt(
    schema: &ExtractionSchema,
    name: &Localized<String>,
    lang: Language,
    contract: OutputContract,
    text: &str,
) -> String {
    let template = match lang {
        Language::Ja => EXTRACTION_TEMPLATE_JA,
        Language::En => EXTRACTION_TEMPLATE_EN,
    };
    let format_name = match contract {
        OutputContract::Yaml => "YAML",
        _ => "JSON",
    };

    template
        .replace("{SUBJECT}", name.get(lang))
        .replace("{FORMAT}", format_name)
        .replace("{SCHEMA}", &render_schema(schema, contract))
        .replace("{TEXT}", text)
}

const EXTRACTION_TEMPLATE_JA: &str = r#"あなたはプライベート情報管理のアシスタントです。

添付したドキュメントから{SUBJECT}に関する情報を抽出してください。

出力は次のスキーマ構造に厳密に一致させ、**純粋な{FORMAT}オブジェクトのみ**を出力してください。

{SCHEMA}

制約条件：
1. `title` と `note` には必ず有効な文字列を記入してください。
2. 他の項目は、ドキュメントに記載がなければ **null** を入れてください。
3. 各キーの順序は上記と同じにしてください。
4. 出力は **1個の純粋な{FORMAT}オブジェクト** のみ。説明を付け加えないでください。
5. {FORMAT}構文の整合性を守り、**正確にパース可能**な状態で返してください。

=== 添付ドキュメントの内容 ===

{TEXT}

-------------------"#;

const EXTRACTION_TEMPLATE_EN: &str = r#"You are an assistant for private information management.

Extract information about {SUBJECT} from the attached document.

Output must strictly match the following schema and return a **pure {FORMAT} object only**.

{SCHEMA}

Constraints:
1. Provide valid strings for `title` and `note`.
2. For other fields, put **null** if not present in the document.
3. Keep the keys in the exact same order as above.
4. Return **exactly one pure {FORMAT} object**. Do not add explanations.
5. Ensure valid {FORMAT} syntax so it is precisely parseable.

=== Attached Document ===

{TEXT}

-------------------"#;
