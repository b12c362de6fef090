//! Golden fixture generator for the TSP conformance tests.
//!
//! Rewrites every encoder-generated body under `tests/golden/`. Run it
//! after an intentional change to the body layout, then review the diff.
//! The hand-written bodies under `tests/golden/legacy/` are not touched.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_golden -p tsp-tests
//! ```
//!
//! # Generated fixtures
//!
//! | Directory  | Contents                                        |
//! |------------|-------------------------------------------------|
//! | greeting   | Two fragments with non-ASCII text, word fields  |
//! | escapes    | Quotes, backslashes, newline, tab, a C0 control |
//! | exercises  | All four metadata fields, full exercise set     |
//! | empty      | No fragments, no metadata                       |

#![allow(clippy::pedantic)]

use tsp_encoder::encode_to_string;
use tsp_tests::{golden_cases, golden_dir};

fn main() {
    for case in golden_cases() {
        let body = encode_to_string(&case.fragments, &case.metadata)
            .unwrap_or_else(|e| panic!("failed to encode {}: {e}", case.name));
        let path = case.body_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .unwrap_or_else(|e| panic!("failed to create {}: {e}", dir.display()));
        }
        std::fs::write(&path, body)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
        println!("  wrote {}", path.display());
    }

    println!("All golden fixtures written to {}", golden_dir().display());
}
