//! C writer.
//!
//! Emits a [`Unit`] as a single self-contained C translation unit: the
//! runtime prelude, forward declarations, function bodies, then `main`.

use crate::ir::*;
use crate::runtime::PRELUDE;
use crate::symbols::Type;

/// Emits IR as C source code.
pub struct CWriter {
    output: String,
    indent: usize,
}

impl Default for CWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit a whole compilation unit.
    pub fn emit(unit: &Unit) -> String {
        let mut writer = Self::new();
        writer.write_unit(unit);
        writer.output
    }

    /// Emit statements alone, without prelude or entry point.
    pub fn emit_nodes(nodes: &[Node]) -> String {
        let mut writer = Self::new();
        writer.write_nodes(nodes);
        writer.output
    }

    fn write_unit(&mut self, unit: &Unit) {
        self.output.push_str(PRELUDE);
        if !PRELUDE.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push('\n');

        if !unit.functions.is_empty() {
            for function in &unit.functions {
                self.line(&format!("void {}(void);", function.name));
            }
            self.output.push('\n');
            for function in &unit.functions {
                self.line(&format!("void {}(void) {{", function.name));
                self.indent += 1;
                self.write_nodes(&function.body);
                self.indent = 0;
                self.line("}");
                self.output.push('\n');
            }
        }

        self.line("int main(void) {");
        self.indent = 1;
        self.write_nodes(&unit.main);
        self.line("return 0;");
        self.indent = 0;
        self.line("}");
    }

    fn write_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.write_node(node);
        }
    }

    fn write_node(&mut self, node: &Node) {
        match node {
            Node::Declare {
                ty,
                name,
                init,
                is_const,
            } => self.write_declare(*ty, name, init, *is_const),

            Node::Print { format, expr } => {
                let stmt = match format {
                    PrintFormat::Str => format!("printf(\"%s\\n\", {});", expr),
                    PrintFormat::Bool => {
                        format!("printf(\"%s\\n\", ({}) ? \"true\" : \"false\");", expr)
                    }
                    PrintFormat::Float => format!("printf(\"%f\\n\", {});", expr),
                    PrintFormat::Int => format!("printf(\"%d\\n\", (int)({}));", expr),
                    PrintFormat::List => format!("print_list({});", expr),
                    PrintFormat::Tuple => format!("print_tuple({});", expr),
                    PrintFormat::Dict => format!("print_dict({});", expr),
                };
                self.line(&stmt);
            }

            Node::If { cond } => self.open(&format!("if ({}) {{", cond)),

            Node::ElseIf { cond } => {
                self.dedent();
                self.open(&format!("}} else if ({}) {{", cond));
            }

            Node::Else => {
                self.dedent();
                self.open("} else {");
            }

            Node::While { cond } => self.open(&format!("while ({}) {{", cond)),

            Node::ForRange {
                var,
                start,
                end,
                step,
                descending,
            } => {
                let compare = if *descending { ">=" } else { "<=" };
                let update = match step {
                    Some(step) => format!("{} += {}", var, step),
                    None => format!("{}++", var),
                };
                self.open(&format!(
                    "for (int {var} = {start}; {var} {compare} {end}; {update}) {{"
                ));
            }

            Node::ForEach {
                var,
                index,
                source,
                iteration,
            } => match iteration {
                Iteration::Chars => {
                    self.open(&format!(
                        "for (int {index} = 0; {source}[{index}] != '\\0'; {index}++) {{"
                    ));
                    self.line(&format!("int {var} = {source}[{index}];"));
                }
                Iteration::Items => {
                    self.open(&format!(
                        "for (int {index} = 0; {index} < {source}.size; {index}++) {{"
                    ));
                    self.line(&format!("int {var} = {source}.data[{index}];"));
                }
                Iteration::Keys => {
                    self.open(&format!(
                        "for (int {index} = 0; {index} < {source}.size; {index}++) {{"
                    ));
                    self.line(&format!("const char* {var} = {source}.keys[{index}];"));
                }
            },

            Node::OpenScope => self.open("{"),

            Node::Call { func, args } => {
                self.line(&format!("{}({});", func, args.join(", ")));
            }

            Node::Raw(text) => self.line(&format!("{};", text)),

            Node::Close => {
                self.dedent();
                self.line("}");
            }
        }
    }

    fn write_declare(&mut self, ty: Type, name: &str, init: &Init, is_const: bool) {
        let c_ty = c_type(ty, is_const);
        match init {
            Init::Expr(expr) => self.line(&format!("{} {} = {};", c_ty, name, expr)),
            Init::Default => match zero_value(ty) {
                Some(value) => self.line(&format!("{} {} = {};", c_ty, name, value)),
                None => self.line(&format!("{} {};", c_ty, name)),
            },
            Init::Elements(items) => {
                let constructor = if ty == Type::Tuple {
                    "tuple_of"
                } else {
                    "list_of"
                };
                let mut args = vec![items.len().to_string()];
                args.extend(items.iter().cloned());
                self.line(&format!(
                    "{} {} = {}({});",
                    c_ty,
                    name,
                    constructor,
                    args.join(", ")
                ));
            }
            Init::Entries(entries) => {
                self.line(&format!("{} {} = dict_new();", c_ty, name));
                for (key, value) in entries {
                    self.line(&format!("dset(&{}, {}, {});", name, key, value));
                }
            }
        }
    }

    fn open(&mut self, header: &str) {
        self.line(header);
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }
}

/// C spelling of a Tern type.
pub fn c_type(ty: Type, is_const: bool) -> String {
    let base = match ty {
        Type::Int | Type::Unknown => "int",
        Type::Float => "double",
        Type::Bool => "bool",
        Type::String => "char*",
        Type::List => "List",
        Type::Dict => "Dict",
        Type::Tuple => "Tuple",
    };
    if is_const {
        format!("const {}", base)
    } else {
        base.to_string()
    }
}

/// Value of a declaration without initialiser; `None` leaves it
/// uninitialised.
fn zero_value(ty: Type) -> Option<&'static str> {
    match ty {
        Type::Int | Type::Unknown => Some("0"),
        Type::String => Some("NULL"),
        Type::List => Some("list_new()"),
        Type::Dict => Some("dict_new()"),
        Type::Tuple => Some("tuple_new()"),
        Type::Float | Type::Bool => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declare(ty: Type, name: &str, init: Init) -> Node {
        Node::Declare {
            ty,
            name: name.to_string(),
            init,
            is_const: false,
        }
    }

    #[test]
    fn test_declarations() {
        let c = CWriter::emit_nodes(&[
            declare(Type::Int, "x", Init::Expr("5".into())),
            declare(Type::String, "s", Init::Default),
            declare(Type::Float, "f", Init::Default),
            declare(Type::List, "xs", Init::Default),
        ]);
        assert_eq!(
            c,
            "int x = 5;\nchar* s = NULL;\ndouble f;\nList xs = list_new();\n"
        );
    }

    #[test]
    fn test_const_string() {
        let c = CWriter::emit_nodes(&[Node::Declare {
            ty: Type::String,
            name: "NAME".into(),
            init: Init::Expr("\"tern\"".into()),
            is_const: true,
        }]);
        assert_eq!(c.trim(), "const char* NAME = \"tern\";");
    }

    #[test]
    fn test_collection_literals() {
        let c = CWriter::emit_nodes(&[
            declare(
                Type::Tuple,
                "t",
                Init::Elements(vec!["1".into(), "2".into()]),
            ),
            declare(
                Type::Dict,
                "d",
                Init::Entries(vec![("\"a\"".into(), "1".into())]),
            ),
        ]);
        assert_eq!(
            c,
            "Tuple t = tuple_of(2, 1, 2);\nDict d = dict_new();\ndset(&d, \"a\", 1);\n"
        );
    }

    #[test]
    fn test_print_formats() {
        let print = |format| {
            CWriter::emit_nodes(&[Node::Print {
                format,
                expr: "v".into(),
            }])
        };
        insta::assert_snapshot!(print(PrintFormat::Str).trim(), @r#"printf("%s\n", v);"#);
        insta::assert_snapshot!(print(PrintFormat::Bool).trim(), @r#"printf("%s\n", (v) ? "true" : "false");"#);
        insta::assert_snapshot!(print(PrintFormat::Int).trim(), @r#"printf("%d\n", (int)(v));"#);
        assert_eq!(print(PrintFormat::Float).trim(), "printf(\"%f\\n\", v);");
        assert_eq!(print(PrintFormat::Dict).trim(), "print_dict(v);");
    }

    #[test]
    fn test_if_chain_indentation() {
        let c = CWriter::emit_nodes(&[
            Node::If { cond: "a".into() },
            Node::Raw("x = 1".into()),
            Node::ElseIf { cond: "b".into() },
            Node::Raw("x = 2".into()),
            Node::Else,
            Node::Raw("x = 3".into()),
            Node::Close,
        ]);
        assert_eq!(
            c,
            "if (a) {\n    x = 1;\n} else if (b) {\n    x = 2;\n} else {\n    x = 3;\n}\n"
        );
    }

    #[test]
    fn test_counted_loops() {
        let up = CWriter::emit_nodes(&[Node::ForRange {
            var: "i".into(),
            start: "1".into(),
            end: "5".into(),
            step: None,
            descending: false,
        }]);
        assert_eq!(up.trim(), "for (int i = 1; i <= 5; i++) {");

        let down = CWriter::emit_nodes(&[Node::ForRange {
            var: "i".into(),
            start: "5".into(),
            end: "1".into(),
            step: Some("-2".into()),
            descending: true,
        }]);
        assert_eq!(down.trim(), "for (int i = 5; i >= 1; i += -2) {");
    }

    #[test]
    fn test_string_iteration() {
        let c = CWriter::emit_nodes(&[
            Node::OpenScope,
            declare(Type::String, "__s1", Init::Expr("\"ab\"".into())),
            Node::ForEach {
                var: "c".into(),
                index: "__i1".into(),
                source: "__s1".into(),
                iteration: Iteration::Chars,
            },
            Node::Close,
            Node::Close,
        ]);
        assert_eq!(
            c,
            "{\n    char* __s1 = \"ab\";\n    for (int __i1 = 0; __s1[__i1] != '\\0'; __i1++) {\n        int c = __s1[__i1];\n    }\n}\n"
        );
    }

    #[test]
    fn test_unit_layout() {
        let unit = Unit {
            functions: vec![Function {
                name: "greet".into(),
                line: 1,
                body: vec![Node::Raw("puts(\"hi\")".into())],
            }],
            main: vec![Node::Raw("greet()".into())],
        };
        let c = CWriter::emit(&unit);
        assert!(c.starts_with(PRELUDE));
        let tail = &c[PRELUDE.len()..];
        assert_eq!(
            tail.trim(),
            "void greet(void);\n\nvoid greet(void) {\n    puts(\"hi\");\n}\n\nint main(void) {\n    greet();\n    return 0;\n}"
        );
    }
}
