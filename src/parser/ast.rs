use std::fmt;
use std::fmt::{Display, Formatter};

/// Byte span of a node in the template source.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
}

pub trait HasMeta {
    fn get_meta(&self) -> &Meta;

    fn to_formatted_string(&self, script: &str) -> String {
        let meta = self.get_meta();
        script[meta.start_index..meta.end_index].to_string()
    }
}

/// Shape of a state container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single value.
    Scalar,
    /// An indexed list of values.
    Array,
    /// A string-keyed map of values.
    Assoc,
}

impl FieldKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Array => "array",
            FieldKind::Assoc => "assoc",
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Integer(i64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitializerType {
    Literal(LiteralType),
    List(Vec<LiteralType>),
    Map(Vec<(String, LiteralType)>),
}

impl InitializerType {
    /// The container kind this initializer can seed.
    pub fn kind(&self) -> FieldKind {
        match self {
            InitializerType::Literal(_) => FieldKind::Scalar,
            InitializerType::List(_) => FieldKind::Array,
            InitializerType::Map(_) => FieldKind::Assoc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclarationData {
    pub kind: FieldKind,
    pub name: String,
    pub initializer: Option<InitializerType>,
    pub meta: Meta,
}

impl HasMeta for FieldDeclarationData {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentType {
    Literal(LiteralType),
    /// Reference to a container declared by the same template.
    Identifier(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclarationData {
    /// Full callable path, e.g. `left_panel.list.reset`.
    pub path: String,
    pub behavior: String,
    pub arguments: Vec<ArgumentType>,
    pub meta: Meta,
}

impl HasMeta for MethodDeclarationData {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}

/// A parsed class template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateData {
    pub class_name: String,
    pub instance: String,
    pub fields: Vec<FieldDeclarationData>,
    pub methods: Vec<MethodDeclarationData>,
    pub meta: Meta,
}

impl HasMeta for TemplateData {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}
