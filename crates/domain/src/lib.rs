//! # astral-domain
//!
//! Pure domain model for the astral voice assistant.
//!
//! ## Responsibilities
//! - Foundational types: identifiers, error conventions, timestamps
//! - Define **Routines** (named, ordered lists of automation actions)
//! - Define **Actions** (one side-effecting step: launch an app, speak, wait, …)
//! - Define **Run reports** (per-action outcomes of one routine execution)
//! - Define **Classifications** (what a piece of transcribed text asks for)
//! - Define the **conversation history window** handed to the LLM
//! - Define the **assistant state machine** (`idle → listening → thinking → speaking`)
//! - Define **Events** broadcast to the UI shell
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod assistant;
pub mod command;
pub mod conversation;
pub mod event;
pub mod routine;
pub mod run;
pub mod system;
