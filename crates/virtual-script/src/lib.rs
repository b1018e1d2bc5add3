//! Virtual script synthesis for template-embedded code.
//!
//! A template document embeds script in places a script parser cannot reach
//! directly. This crate assembles a standalone "virtual" script from slices
//! of the document plus injected glue, records how to map it back, and
//! restores the parse result to the document's coordinates. It handles:
//! - Building the synthesized text and its restore map
//! - Minting identifiers that cannot collide with user code
//! - Remapping a parse of the synthesized text, dropping injected tokens
//! - Parsing single fragments at a fixed document offset
//!
//! # Example
//!
//! ```
//! use script_ast::{ParseContext, ParserOptions};
//! use virtual_script::{parse_virtual_script, VirtualSourceBuilder};
//!
//! let document = "<script>let a = 1;</script>\n<div>{a}</div>";
//!
//! let mut builder = VirtualSourceBuilder::new(document);
//! builder.skip_until_original_offset(8u32);
//! builder.append_original(18u32);
//! let id = builder.generate_unique_id("expr");
//! builder.append_virtual_script(&format!("\nlet {id} = ("));
//! builder.skip_until_original_offset(34u32);
//! builder.append_original(35u32);
//! builder.append_virtual_script(");\n");
//!
//! let ctx = ParseContext::new(ParserOptions::default());
//! let result = parse_virtual_script(&ctx, builder.finish(), document).unwrap();
//! assert_eq!(result.tokens.len(), 6);
//! ```

mod builder;
mod restore;
mod unique_id;

pub use builder::{VirtualScript, VirtualSourceBuilder};
pub use restore::{RestoreContext, StatementRestorer};
pub use unique_id::{UniqueIdGenerator, UNIQUE_ID_PREFIX};

use script_ast::{fix_locations, set_parents, ParseContext, ParseError, ScriptParseResult};
use source_map::{ByteOffset, DocumentLocations};

/// Parses a fragment that starts at `offset` in `document`.
///
/// The result and any error are reported in document coordinates.
pub fn parse_fragment(
    ctx: &ParseContext,
    fragment: &str,
    offset: ByteOffset,
    document: &str,
) -> Result<ScriptParseResult, ParseError> {
    let locations = DocumentLocations::new(document);
    let mut result = ctx
        .parse(fragment)
        .map_err(|error| error.shifted(offset, &locations))?;
    fix_locations(&mut result, offset, &locations);
    set_parents(&mut result.ast, &result.visitor_keys);
    Ok(result)
}

/// Parses a synthesized script and restores it to `document`.
///
/// Parse errors are translated through the script's restore map.
pub fn parse_virtual_script(
    ctx: &ParseContext,
    script: VirtualScript,
    document: &str,
) -> Result<ScriptParseResult, ParseError> {
    let VirtualScript { text, mut context } = script;
    let locations = DocumentLocations::new(document);
    let mut result = ctx.parse(&text).map_err(|error| {
        let restored = context.restore_error(&error, &locations);
        tracing::debug!(
            dist = u32::from(error.offset),
            index = u32::from(restored.index),
            "virtual script failed to parse"
        );
        restored
    })?;
    context.restore(&mut result, &locations);
    Ok(result)
}
