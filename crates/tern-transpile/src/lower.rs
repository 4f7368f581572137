//! Statement dispatcher and code generator.
//!
//! Walks the significant lines once, keeping the block stack, symbol
//! table and diagnostics in a single compilation context, and lowers each
//! statement into [`Node`]s for the active output stream.

use crate::config::Options;
use crate::diagnostics::Diagnostics;
use crate::error::{CapacityError, Resource};
use crate::infer::{infer, leading_identifier};
use crate::ir::{Function, Init, Iteration, Node, PrintFormat, Unit};
use crate::lex::is_identifier;
use crate::output::c::CWriter;
use crate::parse::{Declaration, DictOp, Statement, parse_line, split_top_level};
use crate::rewrite::rewrite_expr;
use crate::scope::{Block, BlockKind, BlockStack, Closing};
use crate::source::{Line, Source};
use crate::symbols::{SymbolTable, Type};
use tracing::{debug, trace};

/// Result of one compilation.
#[derive(Debug, Clone)]
pub struct Transpiled {
    pub unit: Unit,
    pub diagnostics: Diagnostics,
    pub symbols: SymbolTable,
}

impl Transpiled {
    /// Whether the diagnostic gate lets the target file be written.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Render the complete C translation unit.
    pub fn render(&self) -> String {
        CWriter::emit(&self.unit)
    }
}

/// Transpile Tern source text.
///
/// Always runs to the end of the input; problems are reported through
/// [`Transpiled::diagnostics`].
pub fn transpile(source: &str, options: &Options) -> Transpiled {
    let mut lowerer = Lowerer::new(*options);
    for line in Source::new(source).lines() {
        lowerer.line(line);
    }
    lowerer.finish()
}

/// Which explicit closer a line used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    Brace,
    End,
}

/// The main stream plus one stream per function; output goes to the
/// function being defined, if any.
#[derive(Debug)]
struct Emitter {
    main: Vec<Node>,
    functions: Vec<Function>,
    active: Option<usize>,
    capacity: usize,
}

impl Emitter {
    fn new(capacity: usize) -> Self {
        Self {
            main: Vec::new(),
            functions: Vec::new(),
            active: None,
            capacity,
        }
    }

    fn emit(&mut self, node: Node) {
        trace!(?node, function = self.active.is_some(), "emit");
        match self.active.and_then(|i| self.functions.get_mut(i)) {
            Some(function) => function.body.push(node),
            None => self.main.push(node),
        }
    }

    fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    fn begin_function(&mut self, name: &str, line: usize) -> Result<(), CapacityError> {
        if self.functions.len() >= self.capacity {
            return Err(CapacityError {
                resource: Resource::Functions,
                limit: self.capacity,
            });
        }
        self.functions.push(Function {
            name: name.to_string(),
            line,
            body: Vec::new(),
        });
        self.active = Some(self.functions.len() - 1);
        Ok(())
    }

    fn end_function(&mut self) {
        self.active = None;
    }

    fn into_unit(self) -> Unit {
        Unit {
            functions: self.functions,
            main: self.main,
        }
    }
}

struct Lowerer {
    options: Options,
    symbols: SymbolTable,
    blocks: BlockStack,
    diagnostics: Diagnostics,
    emitter: Emitter,
    /// Resources whose exhaustion was already reported.
    exhausted: Vec<Resource>,
    /// Line being processed.
    line: usize,
}

impl Lowerer {
    fn new(options: Options) -> Self {
        let limits = options.limits;
        Self {
            options,
            symbols: SymbolTable::with_capacity(limits.max_vars),
            blocks: BlockStack::with_capacity(limits.max_depth),
            diagnostics: Diagnostics::with_capacity(limits.max_diagnostics),
            emitter: Emitter::new(limits.max_functions),
            exhausted: Vec::new(),
            line: 0,
        }
    }

    fn line(&mut self, line: Line<'_>) {
        self.line = line.number;

        let closer = match line.text {
            "}" => Some(Closer::Brace),
            "end" => Some(Closer::End),
            _ => None,
        };
        if let Some(closer) = closer {
            // Blocks nested deeper than the closer are finished regardless.
            if self.options.mode.auto_close() {
                self.auto_close(line.indent + 1, false);
            }
            self.close(closer);
            return;
        }

        let text = match line.text.strip_prefix('}') {
            Some(rest) if matches!(leading_identifier(rest.trim_start()), "else" | "elif") => {
                rest.trim_start()
            }
            _ => line.text,
        };

        let parsed = parse_line(text);
        trace!(line = line.number, statement = ?parsed.statement, "parsed");

        if self.options.mode.auto_close() {
            self.auto_close(line.indent, parsed.statement.is_continuation());
        }
        for error in &parsed.errors {
            self.error(error.to_string());
        }
        self.dispatch(parsed.statement, line.indent);
    }

    fn auto_close(&mut self, indent: usize, continuation: bool) {
        for block in self.blocks.auto_close(indent, continuation) {
            debug!(
                line = self.line,
                kind = %block.kind,
                opened_at = block.opened_at,
                "auto-close block"
            );
            self.emit_closers(block);
        }
    }

    fn dispatch(&mut self, statement: Statement<'_>, indent: usize) {
        match statement {
            Statement::Declare(decl) => self.declare(decl),
            Statement::Print { expr } => {
                if let Some(expr) = expr {
                    self.print(expr);
                }
            }
            Statement::If { cond, closing } => {
                let node = Node::If {
                    cond: self.expr(cond),
                };
                self.open(BlockKind::If, indent, closing, false, vec![node]);
            }
            Statement::Elif { cond, .. } => {
                let node = Node::ElseIf {
                    cond: self.expr(cond),
                };
                self.continue_chain(BlockKind::Elif, node);
            }
            Statement::Else { .. } => self.continue_chain(BlockKind::Else, Node::Else),
            Statement::While { cond, closing } => {
                let node = Node::While {
                    cond: self.expr(cond),
                };
                self.open(BlockKind::While, indent, closing, false, vec![node]);
            }
            Statement::ForRange {
                var,
                start,
                end,
                step,
                closing,
            } => self.for_range(var, start, end, step, closing, indent),
            Statement::ForIn {
                var,
                iterable,
                closing,
            } => self.for_in(var, iterable, closing, indent),
            Statement::Func { name, closing } => self.func(name, closing, indent),
            Statement::Append { list, value } => self.append(list, value),
            Statement::Dict { op, args } => self.dict(op, &args),
            Statement::Raw(text) => self.raw(text),
            Statement::Invalid => {}
        }
    }

    fn declare(&mut self, decl: Declaration<'_>) {
        let Some(name) = decl.name else {
            return;
        };
        let ty = decl.ty.unwrap_or_else(|| {
            decl.value
                .map_or(Type::Int, |value| infer(value, &self.symbols))
        });

        if let Err(err) = self.symbols.register(name, ty, decl.is_const) {
            self.exhausted(err);
            return;
        }

        let init = match decl.value {
            Some(value) => self.initializer(ty, value),
            None => Init::Default,
        };
        self.emitter.emit(Node::Declare {
            ty,
            name: name.to_string(),
            init,
            is_const: decl.is_const && !ty.is_container(),
        });
    }

    fn initializer(&mut self, ty: Type, value: &str) -> Init {
        let literal = |open: char, close: char| {
            value
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
        };
        match ty {
            Type::List => match literal('[', ']') {
                Some(inner) => Init::Elements(self.elements(inner)),
                None => Init::Expr(self.expr(value)),
            },
            Type::Tuple => match literal('(', ')') {
                Some(inner) => Init::Elements(self.elements(inner)),
                None => Init::Expr(self.expr(value)),
            },
            Type::Dict => match literal('{', '}') {
                Some(inner) => Init::Entries(self.entries(inner)),
                None => Init::Expr(self.expr(value)),
            },
            _ => Init::Expr(self.expr(value)),
        }
    }

    fn elements(&self, inner: &str) -> Vec<String> {
        split_top_level(inner, ',')
            .into_iter()
            .filter(|e| !e.is_empty())
            .map(|e| self.expr(e))
            .collect()
    }

    fn entries(&mut self, inner: &str) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        for entry in split_top_level(inner, ',') {
            if entry.is_empty() {
                continue;
            }
            match split_top_level(entry, ':').as_slice() {
                &[key, value] if !key.is_empty() && !value.is_empty() => {
                    entries.push((self.expr(key), self.expr(value)));
                }
                _ => self.error(format!("malformed dictionary entry '{}'", entry)),
            }
        }
        entries
    }

    fn print(&mut self, expr: &str) {
        let format = PrintFormat::for_type(infer(expr, &self.symbols));
        let expr = self.expr(expr);
        self.emitter.emit(Node::Print { format, expr });
    }

    fn for_range(
        &mut self,
        var: &str,
        start: &str,
        end: &str,
        step: &str,
        closing: Closing,
        indent: usize,
    ) {
        if let Err(err) = self.symbols.register(var, Type::Int, false) {
            self.exhausted(err);
        }
        let step = step.trim();
        let node = Node::ForRange {
            var: var.to_string(),
            start: self.expr(start),
            end: self.expr(end),
            step: (step != "1").then(|| self.expr(step)),
            descending: step.starts_with('-'),
        };
        self.open(BlockKind::For, indent, closing, false, vec![node]);
    }

    /// Desugar `for VAR in ITERABLE` into an index loop.
    ///
    /// Strings, and containers that are not plain variables, are first
    /// bound to a helper inside an extra scope; that scope needs its own
    /// closer.
    fn for_in(&mut self, var: &str, iterable: &str, closing: Closing, indent: usize) {
        let ty = if iterable.starts_with('"') {
            Type::String
        } else {
            infer(iterable, &self.symbols)
        };
        let (iteration, var_ty) = match ty {
            Type::List | Type::Tuple => (Iteration::Items, Type::Int),
            Type::Dict => (Iteration::Keys, Type::String),
            Type::String => (Iteration::Chars, Type::Int),
            _ => {
                self.warning(format!(
                    "cannot iterate over {} value '{}'; treating it as a string",
                    ty, iterable
                ));
                (Iteration::Chars, Type::Int)
            }
        };
        if let Err(err) = self.symbols.register(var, var_ty, false) {
            self.exhausted(err);
        }

        let line = self.line;
        let wrapped = iteration == Iteration::Chars || !is_identifier(iterable);
        let mut nodes = Vec::new();
        let source = if wrapped {
            let (helper, helper_ty) = match iteration {
                Iteration::Chars => (format!("__s{}", line), Type::String),
                Iteration::Items => (format!("__c{}", line), ty),
                Iteration::Keys => (format!("__c{}", line), Type::Dict),
            };
            let init = self.initializer(helper_ty, iterable);
            nodes.push(Node::OpenScope);
            nodes.push(Node::Declare {
                ty: helper_ty,
                name: helper.clone(),
                init,
                is_const: false,
            });
            helper
        } else {
            self.expr(iterable)
        };
        nodes.push(Node::ForEach {
            var: var.to_string(),
            index: format!("__i{}", line),
            source,
            iteration,
        });
        self.open(BlockKind::ForIn, indent, closing, wrapped, nodes);
    }

    fn func(&mut self, name: Option<&str>, closing: Closing, indent: usize) {
        let Some(name) = name else {
            self.open(BlockKind::Entry, indent, closing, false, Vec::new());
            return;
        };
        if name == "main" {
            self.warning("'func main' is ignored; top-level statements form the entry point");
            self.open(BlockKind::Entry, indent, closing, false, Vec::new());
            return;
        }
        if self.blocks.in_function() {
            self.error(format!(
                "function '{}' cannot be defined inside another function",
                name
            ));
            self.open(BlockKind::Entry, indent, closing, false, Vec::new());
            return;
        }
        if let Some(previous) = self.emitter.function(name).map(|f| f.line) {
            self.error(format!(
                "function '{}' already defined at line {}",
                name, previous
            ));
        }

        if !self.open(BlockKind::Func, indent, closing, false, Vec::new()) {
            return;
        }
        if let Err(err) = self.emitter.begin_function(name, self.line) {
            self.exhausted(err);
            if let Some(top) = self.blocks.top_mut() {
                top.kind = BlockKind::Entry;
            }
        }
    }

    fn append(&mut self, list: &str, value: &str) {
        let ty = self.symbols.lookup(list);
        if !matches!(ty, Type::List | Type::Unknown) {
            self.error(format!("append() expects a list, but '{}' is {}", list, ty));
        }
        let args = vec![format!("&{}", self.expr(list)), self.expr(value)];
        self.emitter.emit(Node::Call {
            func: "append".to_string(),
            args,
        });
    }

    fn dict(&mut self, op: DictOp, args: &[&str]) {
        let mut args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
        let mut mismatch = None;
        if let (DictOp::Set, Some(target)) = (op, args.first_mut()) {
            let ty = self.symbols.lookup(target);
            if !matches!(ty, Type::Dict | Type::Unknown) {
                mismatch = Some(format!("dset() expects a dict, but '{}' is {}", target, ty));
            }
            *target = format!("&{}", target);
        }
        if let Some(message) = mismatch {
            self.error(message);
        }
        self.emitter.emit(Node::Call {
            func: op.name().to_string(),
            args,
        });
    }

    fn raw(&mut self, text: &str) {
        let text = text.strip_suffix(';').unwrap_or(text).trim_end();
        if text.is_empty() {
            return;
        }
        let text = self.expr(text);
        self.emitter.emit(Node::Raw(text));
    }

    /// Push a block and emit its opening nodes. Returns `false` when the
    /// nesting limit refused the block; a placeholder then stands in for it
    /// until its closer.
    fn open(
        &mut self,
        kind: BlockKind,
        indent: usize,
        closing: Closing,
        extra_closer: bool,
        nodes: Vec<Node>,
    ) -> bool {
        let mut block = Block::new(kind, indent, self.line, closing);
        block.closed_by_end = self.options.mode.is_raw();
        block.needs_extra_closer = extra_closer;
        if let Err(err) = self.blocks.push(block) {
            self.exhausted(err);
            self.blocks.push_placeholder(block);
            return false;
        }
        debug!(
            line = self.line,
            %kind,
            ?closing,
            depth = self.blocks.depth(),
            "open block"
        );
        for node in nodes {
            self.emitter.emit(node);
        }
        true
    }

    fn continue_chain(&mut self, kind: BlockKind, node: Node) {
        match self.blocks.top_mut() {
            Some(top) if top.kind.continues_chain() => {
                top.kind = kind;
                debug!(line = self.line, %kind, opened_at = top.opened_at, "continue chain");
                if !top.placeholder {
                    self.emitter.emit(node);
                }
            }
            _ => self.error(format!("'{}' without a matching 'if'", kind)),
        }
    }

    fn close(&mut self, closer: Closer) {
        let Some(block) = self.blocks.pop() else {
            match closer {
                Closer::Brace => self.error("unmatched '}'"),
                Closer::End => self.error("'end' has no matching block"),
            }
            return;
        };
        debug!(
            line = self.line,
            kind = %block.kind,
            opened_at = block.opened_at,
            "close block"
        );
        match (closer, block.closing) {
            (Closer::End, Closing::Brace) => self.warning(format!(
                "'end' closes {} block opened with '{{' at line {}",
                block.kind, block.opened_at
            )),
            (Closer::Brace, Closing::Indent) => self.warning(format!(
                "'}}' closes {} block opened with ':' at line {}",
                block.kind, block.opened_at
            )),
            _ => {}
        }
        self.emit_closers(block);
    }

    fn emit_closers(&mut self, block: Block) {
        if block.placeholder {
            return;
        }
        match block.kind {
            BlockKind::Func => self.emitter.end_function(),
            BlockKind::Entry => {}
            _ => {
                self.emitter.emit(Node::Close);
                if block.needs_extra_closer {
                    self.emitter.emit(Node::Close);
                }
            }
        }
    }

    fn finish(mut self) -> Transpiled {
        for block in self.blocks.drain() {
            if block.explicit_only() {
                let closer = match block.closing {
                    Closing::Brace => "'}'",
                    Closing::Indent => "'end'",
                };
                self.diagnostics.error(
                    block.opened_at,
                    format!(
                        "unclosed {} block opened at line {}; missing {}",
                        block.kind, block.opened_at, closer
                    ),
                );
            }
            self.emit_closers(block);
        }
        debug!(
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warning_count(),
            functions = self.emitter.functions.len(),
            "finished"
        );
        Transpiled {
            unit: self.emitter.into_unit(),
            diagnostics: self.diagnostics,
            symbols: self.symbols,
        }
    }

    fn expr(&self, text: &str) -> String {
        rewrite_expr(text, &self.symbols)
    }

    /// Report a capacity error once per resource.
    fn exhausted(&mut self, err: CapacityError) {
        if self.exhausted.contains(&err.resource) {
            return;
        }
        self.exhausted.push(err.resource);
        self.error(err.to_string());
    }

    fn error(&mut self, message: impl Into<String>) {
        self.diagnostics.error(self.line, message);
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.diagnostics.warning(self.line, message);
    }
}
