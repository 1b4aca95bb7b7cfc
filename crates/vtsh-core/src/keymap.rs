#![forbid(unsafe_code)]

//! Platform key codes to terminal byte sequences.
//!
//! The key source reports keys as `(platform_code, class)` pairs. The map
//! turns them into the bytes a VT terminal would have sent, so everything
//! downstream of the [`ByteQueue`](crate::ByteQueue) only ever sees a byte
//! stream.

use std::collections::HashMap;
use std::fmt;

/// Broad category of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    /// Printable character.
    Normal,
    /// Control character (Ctrl+letter, ESC, and similar).
    Control,
    /// Function key (F1..F12).
    Function,
    /// Extended key: arrows, Delete, Home, End.
    Extended,
    /// Modifier key on its own.
    Modifier,
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Control => "control",
            Self::Function => "function",
            Self::Extended => "extended",
            Self::Modifier => "modifier",
        };
        f.write_str(name)
    }
}

/// One key definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDef {
    /// Key category.
    pub class: KeyClass,
    /// Code reported by the platform key source.
    pub platform_code: u32,
    /// Bytes to enqueue when the key is pressed.
    pub sequence: Vec<u8>,
    /// Human-readable name.
    pub name: String,
    /// Whether the key produces visible output.
    pub printable: bool,
}

impl KeyDef {
    /// Build a definition.
    #[must_use]
    pub fn new(
        class: KeyClass,
        platform_code: u32,
        sequence: impl Into<Vec<u8>>,
        name: impl Into<String>,
        printable: bool,
    ) -> Self {
        Self {
            class,
            platform_code,
            sequence: sequence.into(),
            name: name.into(),
            printable,
        }
    }
}

/// Extended-key scan codes.
pub mod scan {
    /// Up arrow.
    pub const UP: u32 = 0x48;
    /// Down arrow.
    pub const DOWN: u32 = 0x50;
    /// Left arrow.
    pub const LEFT: u32 = 0x4B;
    /// Right arrow.
    pub const RIGHT: u32 = 0x4D;
    /// Delete.
    pub const DELETE: u32 = 0x53;
}

/// Lookup table from `(platform_code, class)` to [`KeyDef`].
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    keys: HashMap<(u32, KeyClass), KeyDef>,
}

impl KeyMap {
    /// Empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map populated with the standard definitions: printable ASCII, the
    /// Ctrl+letter codes, ESC and the remaining C0 controls used by
    /// terminals, and the arrow and Delete keys.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut map = Self::new();

        for code in 0x20u8..=0x7E {
            map.add_mapping(KeyDef::new(
                KeyClass::Normal,
                u32::from(code),
                [code],
                char::from(code).to_string(),
                true,
            ));
        }

        for code in 1u8..=26 {
            let letter = char::from(b'A' + code - 1);
            map.add_mapping(KeyDef::new(
                KeyClass::Control,
                u32::from(code),
                [code],
                format!("Ctrl+{letter}"),
                false,
            ));
        }

        for (code, name) in [
            (0x1B_u8, "Escape"),
            (0x1C, "Ctrl+\\"),
            (0x1D, "Ctrl+]"),
            (0x1E, "Ctrl+^"),
            (0x1F, "Ctrl+_"),
            (0x7F, "Backspace"),
        ] {
            map.add_mapping(KeyDef::new(
                KeyClass::Control,
                u32::from(code),
                [code],
                name,
                false,
            ));
        }

        for (code, seq, name) in [
            (scan::UP, &b"\x1b[A"[..], "Up"),
            (scan::DOWN, b"\x1b[B", "Down"),
            (scan::RIGHT, b"\x1b[C", "Right"),
            (scan::LEFT, b"\x1b[D", "Left"),
            (scan::DELETE, b"\x1b[3~", "Delete"),
        ] {
            map.add_mapping(KeyDef::new(KeyClass::Extended, code, seq, name, false));
        }

        map
    }

    /// Insert a definition, replacing any existing one for the same
    /// `(platform_code, class)`. Returns the replaced definition.
    pub fn add_mapping(&mut self, def: KeyDef) -> Option<KeyDef> {
        self.keys.insert((def.platform_code, def.class), def)
    }

    /// Definition for a key, if mapped.
    #[must_use]
    pub fn get(&self, platform_code: u32, class: KeyClass) -> Option<&KeyDef> {
        self.keys.get(&(platform_code, class))
    }

    /// Byte sequence for a key, if mapped.
    #[must_use]
    pub fn sequence(&self, platform_code: u32, class: KeyClass) -> Option<&[u8]> {
        self.get(platform_code, class).map(|def| def.sequence.as_slice())
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_keys_map_to_themselves() {
        let map = KeyMap::with_defaults();
        assert_eq!(map.sequence(u32::from(b'a'), KeyClass::Normal), Some(&b"a"[..]));
        assert_eq!(map.sequence(0x20, KeyClass::Normal), Some(&b" "[..]));
        assert_eq!(map.sequence(0x7E, KeyClass::Normal), Some(&b"~"[..]));
        assert_eq!(map.sequence(0x7F, KeyClass::Normal), None);
        assert!(map.get(u32::from(b'a'), KeyClass::Normal).is_some_and(|d| d.printable));
    }

    #[test]
    fn control_keys() {
        let map = KeyMap::with_defaults();
        assert_eq!(map.sequence(3, KeyClass::Control), Some(&[3u8][..]));
        assert_eq!(map.sequence(0x0D, KeyClass::Control), Some(&[0x0Du8][..]));
        assert_eq!(map.sequence(0x1B, KeyClass::Control), Some(&[0x1Bu8][..]));
        assert_eq!(map.sequence(0x7F, KeyClass::Control), Some(&[0x7Fu8][..]));
        let def = map.get(3, KeyClass::Control).map(|d| d.name.as_str());
        assert_eq!(def, Some("Ctrl+C"));
    }

    #[test]
    fn extended_keys_emit_csi() {
        let map = KeyMap::with_defaults();
        assert_eq!(map.sequence(scan::UP, KeyClass::Extended), Some(&b"\x1b[A"[..]));
        assert_eq!(map.sequence(scan::DOWN, KeyClass::Extended), Some(&b"\x1b[B"[..]));
        assert_eq!(map.sequence(scan::RIGHT, KeyClass::Extended), Some(&b"\x1b[C"[..]));
        assert_eq!(map.sequence(scan::LEFT, KeyClass::Extended), Some(&b"\x1b[D"[..]));
        assert_eq!(
            map.sequence(scan::DELETE, KeyClass::Extended),
            Some(&b"\x1b[3~"[..])
        );
    }

    #[test]
    fn same_code_different_class_is_distinct() {
        // 0x48 is 'H' as a printable key and Up as an extended key.
        let map = KeyMap::with_defaults();
        assert_eq!(map.sequence(0x48, KeyClass::Normal), Some(&b"H"[..]));
        assert_eq!(map.sequence(0x48, KeyClass::Extended), Some(&b"\x1b[A"[..]));
    }

    #[test]
    fn unmapped_key_is_none() {
        let map = KeyMap::with_defaults();
        assert_eq!(map.sequence(0x3B, KeyClass::Function), None);
        assert_eq!(map.sequence(0x2A, KeyClass::Modifier), None);
    }

    #[test]
    fn add_mapping_replaces() {
        let mut map = KeyMap::with_defaults();
        let before = map.len();
        let f1 = KeyDef::new(KeyClass::Function, 0x3B, &b"\x1bOP"[..], "F1", false);
        assert!(map.add_mapping(f1).is_none());
        assert_eq!(map.len(), before + 1);

        let up = KeyDef::new(KeyClass::Extended, scan::UP, &b"\x1bOA"[..], "Up", false);
        let old = map.add_mapping(up);
        assert_eq!(old.map(|d| d.sequence), Some(b"\x1b[A".to_vec()));
        assert_eq!(map.len(), before + 1);
        assert_eq!(map.sequence(scan::UP, KeyClass::Extended), Some(&b"\x1bOA"[..]));
    }

    #[test]
    fn empty_map() {
        let map = KeyMap::new();
        assert!(map.is_empty());
        assert_eq!(map.sequence(u32::from(b'a'), KeyClass::Normal), None);
    }

    #[test]
    fn class_display() {
        assert_eq!(KeyClass::Extended.to_string(), "extended");
    }
}
