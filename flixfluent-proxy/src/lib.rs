//! # FlixFluent Proxy
//!
//! Access to the subtitle and word-analysis proxy service. Every lookup here
//! degrades to deterministic fallback content instead of failing: subtitle
//! fetches fall back to a fixed Korean script, word analyses to a "no
//! analysis" record and translations to "Translation not available".

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod lexicon;
pub mod protocol;
pub mod subtitles;
pub mod text;

// Re-export main types
pub use client::{ProxyClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ProxyError, ProxyResult};
pub use lexicon::{DictionaryWordLookup, KoreanDictionary, ProxyWordLookup, WordLookup};
pub use protocol::{
    Deconstruction, ExampleSentence, SubtitleResponse, WireSeconds, WireSubtitle, WordAnalysis,
    WordTranslation,
};
pub use subtitles::{
    fallback_subtitles, languages_to_try, ProxySubtitleSource, StaticSubtitleSource,
    SubtitleSource,
};
pub use text::{annotate_subtitle, contains_korean, segment_words, SubtitleWord};
