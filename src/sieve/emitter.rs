//! Emit canonical SIEVE script text from the parse tree.

use std::fmt::{self, Write};

use crate::sieve::ast::*;

pub fn emit(script: &Script) -> String {
    let mut out = String::new();
    emit_block(&mut out, &script.commands, 0);
    out
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit(self))
    }
}

fn emit_block(out: &mut String, block: &Block, indent: usize) {
    for command in &block.commands {
        emit_command(out, command, indent);
    }
}

fn emit_command(out: &mut String, command: &Command, indent: usize) {
    let prefix = "    ".repeat(indent);
    out.push_str(&prefix);
    out.push_str(&command.name);
    emit_arguments(out, &command.arguments);

    match &command.block {
        Some(block) => {
            out.push_str(" {\n");
            emit_block(out, block, indent + 1);
            out.push_str(&prefix);
            out.push_str("}\n");
        }
        None => out.push_str(";\n"),
    }
}

fn emit_arguments(out: &mut String, arguments: &Arguments) {
    for arg in &arguments.args {
        out.push(' ');
        match arg {
            Argument::Tag(t) => out.push_str(t),
            Argument::Number(n) => {
                let _ = write!(out, "{n}");
            }
            Argument::StringList(items) => emit_string_or_list(out, items),
        }
    }

    if let Some(list) = &arguments.tests {
        out.push(' ');
        if list.tests.len() == 1 {
            emit_test(out, &list.tests[0]);
        } else {
            out.push('(');
            for (i, test) in list.tests.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                emit_test(out, test);
            }
            out.push(')');
        }
    }
}

fn emit_test(out: &mut String, test: &Test) {
    out.push_str(&test.name);
    emit_arguments(out, &test.arguments);
}

fn emit_string_or_list(out: &mut String, items: &[String]) {
    if items.len() == 1 {
        let _ = write!(out, "\"{}\"", escape_sieve_string(&items[0]));
    } else {
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "\"{}\"", escape_sieve_string(item));
        }
        out.push(']');
    }
}

fn escape_sieve_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sieve::parser::parse;

    #[test]
    fn test_emit_canonical_layout() {
        let script = parse(
            "require [\"fileinto\",\"reject\"];if anyof(header :contains \"Subject\" \"x\",size :over 1K){fileinto \"Junk\";stop;}",
        )
        .unwrap();
        let expected = "require [\"fileinto\", \"reject\"];\n\
                        if anyof (header :contains \"Subject\" \"x\", size :over 1024) {\n    \
                        fileinto \"Junk\";\n    \
                        stop;\n\
                        }\n";
        assert_eq!(emit(&script), expected);
    }

    #[test]
    fn test_emitted_text_parses_back_to_same_tree() {
        let input = r#"
if address :domain :is ["From", "Sender"] "example.com" {
    vacation :days 3 :subject "Away \"now\"" "C:\\temp";
} elsif not exists "X-Seen" {
    discard;
}
"#;
        let script = parse(input).unwrap();
        let reparsed = parse(&script.to_string()).unwrap();
        let strip = |s: &Script| {
            let mut s = s.clone();
            clear_positions(&mut s.commands);
            s
        };
        assert_eq!(strip(&script), strip(&reparsed));
    }

    fn clear_positions(block: &mut Block) {
        for cmd in &mut block.commands {
            cmd.position = Default::default();
            if let Some(tests) = &mut cmd.arguments.tests {
                clear_test_positions(tests);
            }
            if let Some(inner) = &mut cmd.block {
                clear_positions(inner);
            }
        }
    }

    fn clear_test_positions(list: &mut TestList) {
        for test in &mut list.tests {
            test.position = Default::default();
            if let Some(inner) = &mut test.arguments.tests {
                clear_test_positions(inner);
            }
        }
    }
}
