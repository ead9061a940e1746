use pest::error::{Error, ErrorVariant, LineColLocation};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use super::ast::*;

#[derive(Parser)]
#[grammar = "parser/class_grammar.pest"] // relative to src
pub struct TemplateParser;

const TAB_WIDTH: usize = 2;

impl TemplateParser {
    /// Parse template text into its AST.
    pub fn parse_to_ast_from_str(script: &str) -> Result<TemplateData, Error<Rule>> {
        parse_to_ast(script)
    }
}

pub fn parse_to_token_tree(script: &str) -> Result<String, String> {
    let mut tree = vec![];
    match TemplateParser::parse(Rule::template, script) {
        Ok(pairs) => {
            for pair in pairs {
                tree.push(pair_to_string(pair, 0).join("\n"));
            }
        }
        Err(rule) => {
            return Err(format!("Parse error due to {:?}", rule));
        }
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    tree.push(format!("{}{}", " ".repeat(level * TAB_WIDTH), rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

pub fn parse_to_pairs(script: &str) -> Result<Pairs<Rule>, Error<Rule>> {
    TemplateParser::parse(Rule::template, script)
}

pub fn parse_to_ast(script: &str) -> Result<TemplateData, Error<Rule>> {
    let mut pairs = TemplateParser::parse(Rule::template, script)?;
    let template = pairs
        .next()
        .ok_or_else(|| custom_error_at_start("Empty template", script))?;
    for pair in template.into_inner() {
        match pair.as_rule() {
            Rule::class_declaration => return build_ast_from_class_declaration(pair),
            Rule::EOI => { /* Do nothing */ }
            _ => return Err(get_unexpected_error(1, &pair)),
        }
    }
    Err(custom_error_at_start("Template declares no class", script))
}

/// One-line summary of a parse error: position and message.
pub fn describe_error(error: &Error<Rule>) -> String {
    let (line, col) = match error.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    format!("line {}, column {}: {}", line, col, error.variant.message())
}

fn build_ast_from_class_declaration(pair: Pair<Rule>) -> Result<TemplateData, Error<Rule>> {
    let meta = get_meta(&pair);
    let mut class_name = None;
    let mut instance = None;
    let mut fields = vec![];
    let mut methods = vec![];
    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::kw_class | Rule::kw_for => { /* Do nothing */ }
            Rule::class_name => class_name = Some(inner_pair.as_str().to_string()),
            Rule::instance_path => instance = Some(inner_pair.as_str().to_string()),
            Rule::field_declaration => {
                fields.push(build_ast_from_field_declaration(inner_pair)?);
            }
            Rule::method_declaration => {
                methods.push(build_ast_from_method_declaration(inner_pair)?);
            }
            _ => return Err(get_unexpected_error(2, &inner_pair)),
        }
    }
    match (class_name, instance) {
        (Some(class_name), Some(instance)) => Ok(TemplateData {
            class_name,
            instance,
            fields,
            methods,
            meta,
        }),
        _ => Err(Error::new_from_pos(
            ErrorVariant::CustomError {
                message: "Class declaration is missing its name or instance".to_string(),
            },
            pest::Position::from_start(""),
        )),
    }
}

fn build_ast_from_field_declaration(
    pair: Pair<Rule>,
) -> Result<FieldDeclarationData, Error<Rule>> {
    let meta = get_meta(&pair);
    let mut inner = pair.into_inner();
    let kind_pair = next_inner(&mut inner, 3, &meta)?;
    let kind = build_field_kind(kind_pair)?;
    let name = next_inner(&mut inner, 4, &meta)?.as_str().to_string();
    let initializer = match inner.next() {
        Some(init_pair) => Some(build_ast_from_initializer(init_pair)?),
        None => None,
    };
    Ok(FieldDeclarationData {
        kind,
        name,
        initializer,
        meta,
    })
}

fn build_field_kind(pair: Pair<Rule>) -> Result<FieldKind, Error<Rule>> {
    let keyword = match pair.clone().into_inner().next() {
        Some(k) => k,
        None => return Err(get_unexpected_error(5, &pair)),
    };
    Ok(match keyword.as_rule() {
        Rule::kw_scalar => FieldKind::Scalar,
        Rule::kw_array => FieldKind::Array,
        Rule::kw_assoc => FieldKind::Assoc,
        _ => return Err(get_unexpected_error(6, &keyword)),
    })
}

fn build_ast_from_initializer(pair: Pair<Rule>) -> Result<InitializerType, Error<Rule>> {
    let inner_pair = match pair.clone().into_inner().next() {
        Some(p) => p,
        None => return Err(get_unexpected_error(7, &pair)),
    };
    Ok(match inner_pair.as_rule() {
        Rule::literal => InitializerType::Literal(build_ast_from_literal(inner_pair)?),
        Rule::list_literal => {
            let mut items = vec![];
            for item in inner_pair.into_inner() {
                items.push(build_ast_from_literal(item)?);
            }
            InitializerType::List(items)
        }
        Rule::map_literal => {
            let mut entries = vec![];
            for entry in inner_pair.into_inner() {
                entries.push(build_ast_from_map_entry(entry)?);
            }
            InitializerType::Map(entries)
        }
        _ => return Err(get_unexpected_error(8, &inner_pair)),
    })
}

fn build_ast_from_map_entry(pair: Pair<Rule>) -> Result<(String, LiteralType), Error<Rule>> {
    let meta = get_meta(&pair);
    let mut inner = pair.into_inner();
    let key_pair = next_inner(&mut inner, 9, &meta)?;
    let key = match key_pair.clone().into_inner().next() {
        Some(k) if k.as_rule() == Rule::string => unescape_string(k)?,
        Some(k) => k.as_str().to_string(),
        None => return Err(get_unexpected_error(10, &key_pair)),
    };
    let value = build_ast_from_literal(next_inner(&mut inner, 11, &meta)?)?;
    Ok((key, value))
}

fn build_ast_from_literal(pair: Pair<Rule>) -> Result<LiteralType, Error<Rule>> {
    let inner_pair = match pair.clone().into_inner().next() {
        Some(p) => p,
        None => return Err(get_unexpected_error(12, &pair)),
    };
    Ok(match inner_pair.as_rule() {
        Rule::string => LiteralType::String(unescape_string(inner_pair)?),
        Rule::integer => match inner_pair.as_str().parse::<i64>() {
            Ok(n) => LiteralType::Integer(n),
            Err(_) => {
                return Err(Error::new_from_span(
                    ErrorVariant::CustomError {
                        message: format!("Integer out of range: {}", inner_pair.as_str()),
                    },
                    inner_pair.as_span(),
                ))
            }
        },
        Rule::boolean => LiteralType::Boolean(inner_pair.as_str() == "true"),
        _ => return Err(get_unexpected_error(13, &inner_pair)),
    })
}

fn build_ast_from_method_declaration(
    pair: Pair<Rule>,
) -> Result<MethodDeclarationData, Error<Rule>> {
    let meta = get_meta(&pair);
    let mut path = None;
    let mut behavior = None;
    let mut arguments = vec![];
    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::kw_fn => { /* Do nothing */ }
            Rule::instance_path => path = Some(inner_pair.as_str().to_string()),
            Rule::behavior_name => behavior = Some(inner_pair.as_str().to_string()),
            Rule::argument => arguments.push(build_ast_from_argument(inner_pair)?),
            _ => return Err(get_unexpected_error(14, &inner_pair)),
        }
    }
    match (path, behavior) {
        (Some(path), Some(behavior)) => Ok(MethodDeclarationData {
            path,
            behavior,
            arguments,
            meta,
        }),
        _ => Err(Error::new_from_pos(
            ErrorVariant::CustomError {
                message: "Method declaration is missing its path or behavior".to_string(),
            },
            pest::Position::from_start(""),
        )),
    }
}

fn build_ast_from_argument(pair: Pair<Rule>) -> Result<ArgumentType, Error<Rule>> {
    let inner_pair = match pair.clone().into_inner().next() {
        Some(p) => p,
        None => return Err(get_unexpected_error(15, &pair)),
    };
    Ok(match inner_pair.as_rule() {
        Rule::literal => ArgumentType::Literal(build_ast_from_literal(inner_pair)?),
        Rule::identifier => ArgumentType::Identifier(inner_pair.as_str().to_string()),
        _ => return Err(get_unexpected_error(16, &inner_pair)),
    })
}

fn unescape_string(pair: Pair<Rule>) -> Result<String, Error<Rule>> {
    let raw = match pair.clone().into_inner().next() {
        Some(inner) => inner.as_str(),
        None => "",
    };
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            other => {
                return Err(Error::new_from_span(
                    ErrorVariant::CustomError {
                        message: format!(
                            "Unsupported escape sequence: \\{}",
                            other.map(|c| c.to_string()).unwrap_or_default()
                        ),
                    },
                    pair.as_span(),
                ))
            }
        }
    }
    Ok(out)
}

fn next_inner<'i>(
    inner: &mut Pairs<'i, Rule>,
    code: u32,
    meta: &Meta,
) -> Result<Pair<'i, Rule>, Error<Rule>> {
    inner.next().ok_or_else(|| {
        Error::new_from_pos(
            ErrorVariant::CustomError {
                message: format!(
                    "Unexpected end of node at {}..{} [code {}]",
                    meta.start_index, meta.end_index, code
                ),
            },
            pest::Position::from_start(""),
        )
    })
}

fn get_meta(pair: &Pair<Rule>) -> Meta {
    Meta {
        start_index: pair.as_span().start(),
        end_index: pair.as_span().end(),
    }
}

fn custom_error_at_start(message: &str, script: &str) -> Error<Rule> {
    Error::new_from_pos(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        pest::Position::from_start(script),
    )
}

fn get_unexpected_error(src: u32, pair: &Pair<Rule>) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: format!("Unexpected state reached - {:?} [code {}]", pair.as_rule(), src),
        },
        pair.as_span(),
    )
}
