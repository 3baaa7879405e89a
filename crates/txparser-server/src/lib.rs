//! txparser-server — HTTP query surface over a [`txparser_core::TxParser`].
//!
//! | Route                          | Success                        | Errors        |
//! |--------------------------------|--------------------------------|---------------|
//! | `GET /currentblock`            | `200` watermark as text        |               |
//! | `GET /subscribe?address=0x…`   | `200 Subscription successful`  | `400`, `409`  |
//! | `GET /transactions?address=0x…`| `200` JSON array               | `400`, `404`, `500` |

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{is_valid_address, router, serve, TransactionResponse};
