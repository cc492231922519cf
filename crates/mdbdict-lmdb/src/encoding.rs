//! On-disk key/value encoding detection
//!
//! Maps built by older tools may store every key and value with one trailing
//! NUL byte; others store the bytes as given. A dictionary starts out
//! accepting both forms and locks onto whichever one its data turns out to
//! use, so that a map never ends up holding the same key in both forms.

use mdbdict_core::KeyForm;
use std::borrow::Cow;

/// Form used for writes while the encoding is still undecided
#[cfg(not(feature = "no-trailing-null"))]
pub const DEFAULT_WRITE_FORM: KeyForm = KeyForm::WithNul;
#[cfg(feature = "no-trailing-null")]
pub const DEFAULT_WRITE_FORM: KeyForm = KeyForm::WithoutNul;

static BOTH: [KeyForm; 2] = [KeyForm::WithNul, KeyForm::WithoutNul];

/// Which forms a dictionary still considers possible
///
/// Transitions only ever narrow: `Both` becomes one of the single forms, and
/// a single form stays as it is for the life of the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Both,
    WithNul,
    WithoutNul,
}

impl Encoding {
    /// Initial state for a requested form, or `Both` to auto-detect
    pub fn new(requested: Option<KeyForm>) -> Self {
        match requested {
            Some(form) => Self::only(form),
            None => Encoding::Both,
        }
    }

    fn only(form: KeyForm) -> Self {
        match form {
            KeyForm::WithNul => Encoding::WithNul,
            KeyForm::WithoutNul => Encoding::WithoutNul,
        }
    }

    /// Forms to probe on reads, in probe order
    pub fn candidates(&self) -> &'static [KeyForm] {
        match self {
            Encoding::Both => &BOTH,
            Encoding::WithNul => &BOTH[..1],
            Encoding::WithoutNul => &BOTH[1..],
        }
    }

    /// Record that data was found in `form`
    pub fn confirm(&mut self, form: KeyForm) {
        debug_assert!(self.candidates().contains(&form));
        if *self == Encoding::Both {
            *self = Self::only(form);
        }
    }

    /// The single form to write in, deciding on the default if still open
    pub fn resolve_for_write(&mut self) -> KeyForm {
        match self {
            Encoding::Both => {
                *self = Self::only(DEFAULT_WRITE_FORM);
                DEFAULT_WRITE_FORM
            }
            Encoding::WithNul => KeyForm::WithNul,
            Encoding::WithoutNul => KeyForm::WithoutNul,
        }
    }

    /// The confirmed form, if detection has settled
    pub fn settled(&self) -> Option<KeyForm> {
        match self {
            Encoding::Both => None,
            Encoding::WithNul => Some(KeyForm::WithNul),
            Encoding::WithoutNul => Some(KeyForm::WithoutNul),
        }
    }
}

/// Physical bytes for `data` in the given form
pub fn encode(form: KeyForm, data: &[u8]) -> Cow<'_, [u8]> {
    match form {
        KeyForm::WithoutNul => Cow::Borrowed(data),
        KeyForm::WithNul => {
            let mut bytes = Vec::with_capacity(data.len() + 1);
            bytes.extend_from_slice(data);
            bytes.push(0);
            Cow::Owned(bytes)
        }
    }
}

/// Copy stored bytes into `buf`, stopping at the first NUL
///
/// Invalid UTF-8 is replaced rather than rejected; maps are text.
pub fn copy_terminated(buf: &mut String, data: &[u8]) {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    buf.clear();
    buf.push_str(&String::from_utf8_lossy(&data[..end]));
}

/// Lowercases keys into a reusable buffer when folding is enabled
#[derive(Debug, Default)]
pub struct KeyFolder {
    enabled: bool,
    buf: String,
}

impl KeyFolder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            buf: String::new(),
        }
    }

    /// The key to use for this call; valid until the next `fold`
    pub fn fold<'a>(&'a mut self, key: &'a str) -> &'a str {
        if !self.enabled {
            return key;
        }
        self.buf.clear();
        self.buf.push_str(key);
        self.buf.make_ascii_lowercase();
        &self.buf
    }
}
