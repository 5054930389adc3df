use super::{MessageValue, ValueType};

/// Expected shape of a container, either by kind or by full signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'s> {
    Type(ValueType),
    Signature(&'s str),
}

/// One step of a navigation pipeline, see [`Cursor::follow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'s> {
    /// Enter the container under the cursor if it is of this kind.
    Type(ValueType),
    /// Enter the container under the cursor if its signature is exactly this.
    Signature(&'s str),
    /// Scan `{sv}` entries for this key and stop at its value.
    Key(&'s str),
}

/// A position inside a message tree.
///
/// A cursor is a cheap copyable view: a slice of sibling values and an index
/// into it. Entering a container yields a new cursor over the container's
/// children; a failed step never touches the cursor it was called on.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    siblings: &'a [MessageValue],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(values: &'a [MessageValue]) -> Self {
        Self {
            siblings: values,
            position: 0,
        }
    }

    pub fn current(&self) -> Option<&'a MessageValue> {
        self.siblings.get(self.position)
    }

    pub fn arg_type(&self) -> ValueType {
        self.current().map_or(ValueType::Invalid, MessageValue::value_type)
    }

    pub fn signature(&self) -> String {
        self.current().map(MessageValue::signature).unwrap_or_default()
    }

    /// Moves to the next sibling. Returns `false` once the end of the
    /// enclosing container is reached.
    pub fn advance(&mut self) -> bool {
        if self.position < self.siblings.len() {
            self.position += 1;
        }
        self.position < self.siblings.len()
    }

    pub fn recurse_into(&self, shape: Shape<'_>) -> Option<Cursor<'a>> {
        let value = self.current()?;
        let matches = match shape {
            Shape::Type(expected) => value.value_type() == expected,
            Shape::Signature(expected) => matches_signature(value, expected),
        };
        if !matches {
            return None;
        }
        value.children().map(Cursor::new)
    }

    pub fn recurse_into_type(&self, expected: ValueType) -> Option<Cursor<'a>> {
        self.recurse_into(Shape::Type(expected))
    }

    pub fn recurse_into_signature(&self, expected: &str) -> Option<Cursor<'a>> {
        self.recurse_into(Shape::Signature(expected))
    }

    /// Scans the `{sv}` entries starting at this cursor, left to right, and
    /// returns a cursor on the value of the first entry whose key equals
    /// `key`.
    pub fn find_by_key(&self, key: &str) -> Option<Cursor<'a>> {
        let first = self.current()?;
        if !matches_signature(first, "{sv}") {
            return None;
        }
        self.siblings[self.position..].iter().find_map(|entry| {
            if entry.value_type() != ValueType::DictEntry {
                return None;
            }
            let mut inner = Cursor::new(entry.children()?);
            if inner.read_string()? != key {
                return None;
            }
            inner.advance();
            Some(inner)
        })
    }

    pub fn step_into_type(&mut self, expected: ValueType) -> bool {
        self.commit(self.recurse_into_type(expected))
    }

    pub fn step_into_signature(&mut self, expected: &str) -> bool {
        self.commit(self.recurse_into_signature(expected))
    }

    pub fn step_to_key(&mut self, key: &str) -> bool {
        self.commit(self.find_by_key(key))
    }

    /// Runs `steps` in order from this cursor. Either every step succeeds
    /// and the final position is returned, or nothing is.
    pub fn follow(&self, steps: &[Step<'_>]) -> Option<Cursor<'a>> {
        steps.iter().try_fold(*self, |cursor, step| match *step {
            Step::Type(expected) => cursor.recurse_into_type(expected),
            Step::Signature(expected) => cursor.recurse_into_signature(expected),
            Step::Key(key) => cursor.find_by_key(key),
        })
    }

    pub fn read_string(&self) -> Option<&'a str> {
        match self.current()? {
            MessageValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn read_object_path(&self) -> Option<&'a str> {
        match self.current()? {
            MessageValue::ObjectPath(p) => Some(p),
            _ => None,
        }
    }

    fn commit(&mut self, next: Option<Cursor<'a>>) -> bool {
        match next {
            Some(cursor) => {
                *self = cursor;
                true
            }
            None => false,
        }
    }
}

/// Compares a value's signature against `expected` without building the
/// signature string.
fn matches_signature(value: &MessageValue, expected: &str) -> bool {
    strip_signature(value, expected).is_some_and(str::is_empty)
}

fn strip_signature<'s>(value: &MessageValue, sig: &'s str) -> Option<&'s str> {
    match value {
        MessageValue::Invalid => None,
        MessageValue::String(_) => sig.strip_prefix('s'),
        MessageValue::ObjectPath(_) => sig.strip_prefix('o'),
        MessageValue::Variant(_) => sig.strip_prefix('v'),
        MessageValue::Opaque(own) => sig.strip_prefix(own.as_str()),
        MessageValue::Array {
            element_signature, ..
        } => sig
            .strip_prefix('a')?
            .strip_prefix(element_signature.as_str()),
        MessageValue::DictEntry(pair) => {
            let rest = sig.strip_prefix('{')?;
            let rest = strip_signature(&pair[0], rest)?;
            let rest = strip_signature(&pair[1], rest)?;
            rest.strip_prefix('}')
        }
    }
}
