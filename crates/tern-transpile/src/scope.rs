//! Block/scope tracker.
//!
//! Every open block remembers how it may be closed. Indent blocks close
//! when a later line dedents to or past their opening column; brace
//! blocks only close on a lone `}`. Either may be closed with `end`.

use crate::error::{CapacityError, Resource};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    Elif,
    Else,
    While,
    For,
    ForIn,
    Func,
    /// `func main` or a rejected function: balances its closer but emits
    /// no braces and does not redirect output.
    Entry,
}

impl BlockKind {
    /// Whether an `elif`/`else` line may extend this block.
    pub fn continues_chain(self) -> bool {
        matches!(self, BlockKind::If | BlockKind::Elif)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::If => "if",
            BlockKind::Elif => "elif",
            BlockKind::Else => "else",
            BlockKind::While => "while",
            BlockKind::For => "for",
            BlockKind::ForIn => "for-in",
            BlockKind::Func | BlockKind::Entry => "func",
        };
        f.write_str(name)
    }
}

/// Closing discipline chosen when a block is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// Header ended with `:`; closes on dedent or `end`.
    Indent,
    /// Header ended with `{`; closes on a lone `}`.
    Brace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub indent: usize,
    pub opened_at: usize,
    /// Mutates along an if-chain; everything else is fixed at push time.
    pub kind: BlockKind,
    pub closing: Closing,
    /// Opened in raw mode: only an explicit closer ends it.
    pub closed_by_end: bool,
    /// The opener emitted a wrapping scope that needs its own `}`.
    pub needs_extra_closer: bool,
    /// Refused by the depth limit: nothing was emitted for it, so it only
    /// absorbs its closer.
    pub placeholder: bool,
}

impl Block {
    pub fn new(kind: BlockKind, indent: usize, opened_at: usize, closing: Closing) -> Self {
        Self {
            indent,
            opened_at,
            kind,
            closing,
            closed_by_end: false,
            needs_extra_closer: false,
            placeholder: false,
        }
    }

    /// Whether dedenting can never close this block.
    pub fn explicit_only(&self) -> bool {
        self.closing == Closing::Brace || self.closed_by_end
    }
}

/// LIFO stack of open blocks with a depth limit.
#[derive(Debug, Clone)]
pub struct BlockStack {
    blocks: Vec<Block>,
    capacity: usize,
}

impl BlockStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, block: Block) -> Result<(), CapacityError> {
        if self.blocks.len() >= self.capacity {
            return Err(CapacityError {
                resource: Resource::Blocks,
                limit: self.capacity,
            });
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Record a block refused by [`BlockStack::push`] so that its closer
    /// still pairs with it. Placeholders count towards the depth, so
    /// everything nested inside one is refused as well.
    pub fn push_placeholder(&mut self, mut block: Block) {
        block.placeholder = true;
        self.blocks.push(block);
    }

    pub fn pop(&mut self) -> Option<Block> {
        self.blocks.pop()
    }

    pub fn top(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Block> {
        self.blocks.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether output currently goes to a function body.
    pub fn in_function(&self) -> bool {
        self.blocks.iter().any(|b| b.kind == BlockKind::Func)
    }

    /// Close the indent blocks a line at `indent` no longer nests inside,
    /// innermost first.
    ///
    /// Stops at the first brace or raw-mode block. A continuation line
    /// (`elif`/`else`) stops at an `if`/`elif` on its own column instead of
    /// closing it. A function block is the last one considered in a pass.
    pub fn auto_close(&mut self, indent: usize, continuation: bool) -> Vec<Block> {
        let mut closed = Vec::new();
        while let Some(top) = self.blocks.last().copied() {
            if top.explicit_only() || indent > top.indent {
                break;
            }
            if top.kind == BlockKind::Func {
                self.blocks.pop();
                closed.push(top);
                break;
            }
            if indent == top.indent && continuation && top.kind.continues_chain() {
                break;
            }
            self.blocks.pop();
            closed.push(top);
        }
        closed
    }

    /// Remove every open block, innermost first.
    pub fn drain(&mut self) -> Vec<Block> {
        let mut drained: Vec<Block> = self.blocks.drain(..).collect();
        drained.reverse();
        drained
    }
}

impl Default for BlockStack {
    fn default() -> Self {
        Self::with_capacity(crate::config::Limits::default().max_depth)
    }
}
