use super::*;

// ============================================================================
// Type references
// ============================================================================

ast_enum!(
    /// The type part of a declaration's specifiers
    TypeRef {
        Builtin(BuiltinType) = BUILTIN_TYPE,
        Named(NamedType) = NAMED_TYPE,
        Struct(StructSpecifier) = STRUCT_SPECIFIER,
        Enum(EnumSpecifier) = ENUM_SPECIFIER,
    }
);

impl TypeRef {
    /// Spelling of the type without template arguments: `float4`,
    /// `metal::sampler`, the struct or enum tag. `None` for anonymous
    /// structs and enums.
    pub fn name(&self) -> Option<SmolStr> {
        match self {
            TypeRef::Builtin(ty) => ty.name(),
            TypeRef::Named(ty) => Some(ty.path()),
            TypeRef::Struct(ty) => ty.name(),
            TypeRef::Enum(ty) => ty.name(),
        }
    }

    pub fn template_args(&self) -> Option<TemplateArgList> {
        match self {
            TypeRef::Builtin(ty) => ty.template_args(),
            _ => None,
        }
    }
}

ast_node!(BuiltinType, BUILTIN_TYPE);

impl BuiltinType {
    first_child_method!(template_args, TemplateArgList);

    pub fn name(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::PRIMITIVE_TYPE).map(|t| SmolStr::new(t.text()))
    }

    /// Texture, depth and sampler types; these only ever live in argument
    /// tables and never in an address space
    pub fn is_opaque(&self) -> bool {
        self.name().is_some_and(|name| {
            name.starts_with("texture") || name.starts_with("depth") || name == "sampler"
        })
    }
}

ast_node!(NamedType, NAMED_TYPE);

impl NamedType {
    pub fn segments(&self) -> Vec<SmolStr> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| SmolStr::new(t.text()))
            .collect()
    }

    /// Segments joined with `::`
    pub fn path(&self) -> SmolStr {
        SmolStr::from(self.segments().join("::"))
    }

    pub fn is_qualified(&self) -> bool {
        has_token(&self.0, SyntaxKind::COLON_COLON)
    }
}

ast_node!(TemplateArgList, TEMPLATE_ARG_LIST);

/// One argument of `<...>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateArg {
    Type(TypeRef),
    Int(SmolStr),
}

impl TemplateArgList {
    children_method!(types, TypeRef);

    pub fn args(&self) -> Vec<TemplateArg> {
        self.0
            .children_with_tokens()
            .filter_map(|element| match element {
                rowan::NodeOrToken::Node(node) => TypeRef::cast(node).map(TemplateArg::Type),
                rowan::NodeOrToken::Token(token) if token.kind() == SyntaxKind::INT_NUMBER => {
                    Some(TemplateArg::Int(SmolStr::new(token.text())))
                }
                rowan::NodeOrToken::Token(_) => None,
            })
            .collect()
    }
}

// ============================================================================
// Address spaces
// ============================================================================

/// Where a pointer or variable lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    Device,
    Constant,
    Thread,
    Threadgroup,
    ThreadgroupImageblock,
}

impl AddressSpace {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressSpace::Device => "device",
            AddressSpace::Constant => "constant",
            AddressSpace::Thread => "thread",
            AddressSpace::Threadgroup => "threadgroup",
            AddressSpace::ThreadgroupImageblock => "threadgroup_imageblock",
        }
    }

    /// Whether all threads of a dispatch see the same memory
    pub fn is_shared(self) -> bool {
        matches!(self, AddressSpace::Device | AddressSpace::Constant)
    }
}

impl std::fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Structs
// ============================================================================

ast_node!(StructSpecifier, STRUCT_SPECIFIER);

impl StructSpecifier {
    first_child_method!(field_list, FieldList);

    pub fn name(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }

    /// `struct Foo` without a body
    pub fn is_forward(&self) -> bool {
        self.field_list().is_none()
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDeclaration> + use<> {
        self.field_list()
            .into_iter()
            .flat_map(|list| list.fields().collect::<Vec<_>>())
    }
}

ast_node!(FieldList, FIELD_LIST);

impl FieldList {
    children_method!(fields, FieldDeclaration);
}

ast_node!(FieldDeclaration, FIELD_DECLARATION);

impl FieldDeclaration {
    first_child_method!(ty, TypeRef);
    children_method!(attribute_specifiers, AttributeSpecifier);
    has_token_method!(is_const, CONST_KW, "const float x;");
    address_space_method!();

    /// Every name declared, `float a, b;` has two
    pub fn names(&self) -> Vec<SmolStr> {
        self.0
            .children()
            .filter_map(|child| declared_name(&child))
            .filter_map(|name| name.text())
            .collect()
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.attribute_specifiers()
            .flat_map(|specifier| specifier.attributes().collect::<Vec<_>>())
    }

    /// Attribute by name, e.g. `position` in `float4 pos [[position]];`
    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes().find(|attr| attr.name().as_deref() == Some(name))
    }
}

/// Name of a declarator node that stands directly in a declaration
fn declared_name(node: &SyntaxNode) -> Option<Name> {
    match node.kind() {
        SyntaxKind::NAME => Name::cast(node.clone()),
        SyntaxKind::POINTER_DECLARATOR
        | SyntaxKind::REFERENCE_DECLARATOR
        | SyntaxKind::ARRAY_DECLARATOR
        | SyntaxKind::FUNCTION_DECLARATOR => declarator_name(node),
        _ => None,
    }
}

// ============================================================================
// Enums
// ============================================================================

ast_node!(EnumSpecifier, ENUM_SPECIFIER);

impl EnumSpecifier {
    first_child_method!(enumerator_list, EnumeratorList);
    has_token_method!(is_scoped, CLASS_KW, "enum class Mode { A };");

    pub fn name(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }

    /// Underlying type after `:`
    pub fn base(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn enumerators(&self) -> impl Iterator<Item = Enumerator> + use<> {
        self.enumerator_list()
            .into_iter()
            .flat_map(|list| list.enumerators().collect::<Vec<_>>())
    }
}

ast_node!(EnumeratorList, ENUMERATOR_LIST);

impl EnumeratorList {
    children_method!(enumerators, Enumerator);
}

ast_node!(Enumerator, ENUMERATOR);

impl Enumerator {
    first_child_method!(value, Expression);

    pub fn name(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }
}
