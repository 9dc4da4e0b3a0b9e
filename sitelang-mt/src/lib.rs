//! Machine translation support for sitelang
//!
//! A [`TranslationGateway`] wraps any [`MachineTranslator`] and applies the
//! batch rules: same-language requests and blank entries never reach the
//! provider, and results come back in input order. [`Autotranslator`] builds
//! the two request-level operations on top of it.
//!
//! # Example
//!
//! ```ignore
//! use sitelang_mt::{GoogleTranslateProvider, MimeType, TranslationGateway};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = TranslationGateway::new(Arc::new(GoogleTranslateProvider::from_env()?));
//!     let texts = vec!["".to_string(), "Add to cart".to_string()];
//!     let translated = gateway.translate_batch(&texts, "en", "fr", MimeType::PlainText).await?;
//!     assert_eq!(translated[0], "");
//!     Ok(())
//! }
//! ```

pub mod autotranslate;
pub mod entry;
pub mod error;
pub mod field;
pub mod gateway;
pub mod google_translate;
pub mod mock;
pub mod translator;


pub use autotranslate::{
    AutotranslateOptions, AutotranslateRequest, AutotranslateResponse, AutotranslateTextRequest,
    AutotranslateTextResponse, Autotranslator, Availability,
};
pub use entry::{
    EntryId, EntryRowRequest, EntrySource, InMemoryEntrySource, TITLE_FIELD, save_entry_row,
};
pub use error::{MtError, MtResult};
pub use field::{FieldKind, MimeType};
pub use gateway::TranslationGateway;
pub use google_translate::{API_KEY_ENV, GoogleTranslateProvider};
pub use mock::{MockMode, MockTranslator};
pub use translator::{MachineTranslator, resolve_language_code, validate_locale};
