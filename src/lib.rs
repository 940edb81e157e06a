//! # HomeMatch
//!
//! Personalized real-estate listings built from a language model and a
//! vector collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────┐   ┌────────────┐   ┌──────────────┐
//! │  Generate  │──▶│   Load   │──▶│ Collection │──▶│    Search    │
//! │ (LLM+JSON) │   │ doc+meta │   │ (vectors)  │   │  top-N hits  │
//! └────────────┘   └──────────┘   └────────────┘   └──────┬───────┘
//!                                                         ▼
//!                                                 ┌──────────────┐
//!                                                 │ Personalize  │
//!                                                 │ (LLM rewrite)│
//!                                                 └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! homematch generate --count 10 --out listings.jsonl
//! homematch load listings.jsonl
//! homematch search "quiet house near a park"
//! homematch personalize --questionnaire answers.toml
//! homematch collection
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Listings, stored records, retrieval matches |
//! | [`error`] | Error kinds returned by the pipeline |
//! | [`llm`] | Language model abstraction |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`store`] | Vector collection trait and in-memory backend |
//! | [`generate`] | Listing generation |
//! | [`load`] | Loading listings into a collection |
//! | [`search`] | Similarity retrieval |
//! | [`personalize`] | Persona-aware description rewriting |
//! | [`inspect`] | Collection summary |

pub mod config;
pub mod embedding;
pub mod error;
pub mod generate;
pub mod inspect;
pub mod llm;
pub mod load;
pub mod logging;
pub mod models;
pub mod personalize;
pub mod search;
pub mod store;
