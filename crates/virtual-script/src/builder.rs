//! Assembles a synthesized script from original slices and virtual fragments.

use crate::restore::{RestoreContext, StatementRestorer};
use crate::UniqueIdGenerator;
use script_ast::{NodeId, ScriptParseResult};
use source_map::{ByteOffset, RestoreMap, Span};
use text_size::TextSize;

/// A finished synthesized script and everything needed to restore its parse.
pub struct VirtualScript {
    /// The synthesized text handed to the script parser.
    pub text: String,
    /// The map and statement restorers recorded while building `text`.
    pub context: RestoreContext,
}

/// Builds a synthesized script by consuming an original document left to right.
///
/// `consumed_index` only ever moves forward. Copy and skip requests at or
/// behind it are no-ops, so a caller that revisits an offset cannot corrupt
/// the restore map. Callers are expected to issue offsets in non-decreasing
/// order; this is not checked beyond the no-op guard.
pub struct VirtualSourceBuilder<'a> {
    original: &'a str,
    script: String,
    consumed_index: usize,
    map: RestoreMap,
    unique: UniqueIdGenerator,
    restorers: Vec<StatementRestorer>,
}

impl<'a> VirtualSourceBuilder<'a> {
    /// Creates a builder over `original` with nothing consumed.
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            script: String::new(),
            consumed_index: 0,
            map: RestoreMap::new(),
            unique: UniqueIdGenerator::new(),
            restorers: Vec::new(),
        }
    }

    /// The original document.
    #[inline]
    pub fn original(&self) -> &'a str {
        self.original
    }

    /// The synthesized text so far.
    #[inline]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// The original offset up to which text has been copied or skipped.
    #[inline]
    pub fn consumed_index(&self) -> ByteOffset {
        TextSize::from(self.consumed_index as u32)
    }

    /// The restore map recorded so far.
    #[inline]
    pub fn restore_map(&self) -> &RestoreMap {
        &self.map
    }

    /// Drops the next `len` original bytes without copying them.
    pub fn skip_original_offset(&mut self, len: u32) {
        self.consumed_index += len as usize;
    }

    /// Drops original text up to `offset`. Never moves backwards.
    pub fn skip_until_original_offset(&mut self, offset: impl Into<ByteOffset>) {
        let offset = u32::from(offset.into()) as usize;
        self.consumed_index = self.consumed_index.max(offset);
    }

    /// Copies original text from the consumed index up to `offset`.
    ///
    /// Does nothing if `offset` is at or behind the consumed index. Offsets
    /// past the end of the document are clamped to it.
    pub fn append_original(&mut self, offset: impl Into<ByteOffset>) {
        let end = floor_char_boundary(self.original, u32::from(offset.into()) as usize);
        let start = ceil_char_boundary(self.original, self.consumed_index);
        if end <= start {
            return;
        }

        let dist_start = self.script.len() as u32;
        self.script.push_str(&self.original[start..end]);
        self.map.push_copy(
            TextSize::from(start as u32),
            Span::new(dist_start, self.script.len() as u32),
        );
        tracing::trace!(original = start, dist = dist_start, len = end - start, "copied original");
        self.consumed_index = end;
    }

    /// Copies whatever original text has not been consumed yet.
    pub fn append_original_to_end(&mut self) {
        self.append_original(TextSize::from(self.original.len() as u32));
    }

    /// Appends synthetic text with no original counterpart.
    pub fn append_virtual_script(&mut self, fragment: &str) {
        let dist_start = self.script.len() as u32;
        self.script.push_str(fragment);
        self.map
            .push_virtual(Span::new(dist_start, self.script.len() as u32));
    }

    /// Returns an identifier that occurs neither in the original document nor
    /// in the synthesized text so far.
    pub fn generate_unique_id(&mut self, base: &str) -> String {
        self.unique.generate(base, &[self.original, &self.script])
    }

    /// Registers a callback that fixes up synthetic top-level statements
    /// after the parse result has been remapped.
    ///
    /// Each top-level statement is offered to the pending callbacks in
    /// registration order; a callback returning `true` has done its job and
    /// is not called again during that restore pass.
    pub fn add_restore_statement_process<F>(&mut self, process: F)
    where
        F: FnMut(NodeId, &mut ScriptParseResult) -> bool + 'static,
    {
        self.restorers.push(Box::new(process));
    }

    /// Finishes synthesis.
    pub fn finish(self) -> VirtualScript {
        tracing::debug!(
            original_len = self.original.len(),
            script_len = self.script.len(),
            points = self.map.points().len(),
            virtual_ranges = self.map.virtual_ranges().len(),
            "built virtual script"
        );
        VirtualScript {
            text: self.script,
            context: RestoreContext::with_restorers(self.map, self.restorers),
        }
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
