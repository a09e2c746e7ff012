//! Session-code and QR-token issuance.

use chrono::Utc;
use persistence::repositories::RunRepository;
use thiserror::Error;

use crate::config::Config;

/// How many collisions the generator tolerates before giving up. With a
/// 31-character alphabet and 5-character codes the space exceeds 2.8e7;
/// hitting this limit means something other than luck is wrong.
const MAX_CODE_ATTEMPTS: usize = 16;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("could not find an unused session code after {MAX_CODE_ATTEMPTS} attempts")]
    Exhausted,
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// Issues session codes and signed QR tokens.
pub struct CodeIssuer {
    runs: RunRepository,
    signing_key: Vec<u8>,
    alphabet: String,
    code_len: usize,
    ttl: chrono::Duration,
}

impl CodeIssuer {
    pub fn new(runs: RunRepository, config: &Config) -> Self {
        Self {
            runs,
            signing_key: config.signing_key.as_bytes().to_vec(),
            alphabet: config.session_code_alphabet.clone(),
            code_len: config.session_code_len,
            ttl: config.qr_ttl(),
        }
    }

    /// Produces a session code that no run has ever used.
    ///
    /// The store check here keeps the common path collision-free; the unique
    /// index on `runs.session_code` still backstops a race between two
    /// issuers, which surfaces as a collision retry at the caller.
    pub async fn new_session_code(&self) -> Result<String, IssueError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = shared::codes::generate(&self.alphabet, self.code_len);
            if !self.runs.code_exists(&code).await? {
                return Ok(code);
            }
            tracing::debug!(code = %code, "Session code collision, retrying");
        }
        Err(IssueError::Exhausted)
    }

    /// Mints a signed QR token for a session code, expiring after the
    /// configured TTL.
    pub fn mint_qr_token(&self, session_code: &str) -> String {
        shared::token::mint(&self.signing_key, session_code, Utc::now() + self.ttl)
    }

    /// Verifies a signed QR token and returns the embedded session code.
    pub fn verify_qr_token(&self, token: &str) -> Result<String, shared::token::TokenError> {
        shared::token::verify(&self.signing_key, token, Utc::now())
    }
}
