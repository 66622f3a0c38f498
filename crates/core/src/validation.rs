// Credential shape validation
//
// Runs before any lookup or mutation, for both registration and login.
// Decision: Only dot-atom local parts on a dotted hostname are accepted. Quoted local parts,
//           domain literals and display names are rejected, so a stored email can never
//           contain the file's field delimiter or a line break.

use email_address::{EmailAddress, Options};

use crate::error::ValidationError;

/// Minimum password length in characters (inclusive)
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Maximum password length in characters (inclusive)
pub const MAX_PASSWORD_CHARS: usize = 15;

/// Validate an email/password pair.
///
/// Password length is counted in characters, not bytes, and both bounds are inclusive.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::Empty);
    }

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    let len = password.chars().count();
    if !(MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&len) {
        return Err(ValidationError::PasswordLength {
            min: MIN_PASSWORD_CHARS,
            max: MAX_PASSWORD_CHARS,
        });
    }

    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    if email.contains(',') || email.chars().any(char::is_control) {
        return false;
    }

    let options = Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld();

    match EmailAddress::parse_with_options(email, options) {
        Ok(addr) => addr.local_part().chars().all(is_atom_char),
        Err(_) => false,
    }
}

/// Unquoted local-part characters (RFC 5322 atext plus the dot separator)
fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c)
}
