use super::*;

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    children_method!(items, Item);
    descendants_method!(functions, FunctionDefinition, "Every function definition, including those inside namespaces.");
    descendants_method!(structs, StructSpecifier, "Every struct specifier in the file.");

    /// Functions carrying a `vertex`, `fragment` or `kernel` qualifier
    pub fn entry_points(&self) -> impl Iterator<Item = FunctionDefinition> + '_ {
        self.functions().filter(|f| f.stage().is_some())
    }

    /// Find a function by name
    pub fn function(&self, name: &str) -> Option<FunctionDefinition> {
        self.functions().find(|f| f.name().as_deref() == Some(name))
    }
}

ast_enum!(
    /// A top-level item (or one inside a namespace)
    Item {
        Function(FunctionDefinition) = FUNCTION_DEFINITION,
        Declaration(Declaration) = DECLARATION,
        Using(UsingDeclaration) = USING_DECLARATION,
        Alias(AliasDeclaration) = ALIAS_DECLARATION,
        Namespace(NamespaceDefinition) = NAMESPACE_DEFINITION,
    }
);

// ============================================================================
// Functions
// ============================================================================

/// Shader stage a function is an entry point for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Kernel,
}

impl ShaderStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Kernel => "kernel",
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

ast_node!(FunctionDefinition, FUNCTION_DEFINITION);

impl FunctionDefinition {
    first_child_method!(return_type, TypeRef);
    first_child_method!(body, CompoundStatement);
    children_method!(attribute_specifiers, AttributeSpecifier);
    has_token_method!(is_inline, INLINE_KW, "inline float sq(float x) { return x * x; }");
    has_token_method!(is_static, STATIC_KW);

    token_to_enum_method!(stage, ShaderStage, [
        VERTEX_KW => Vertex,
        FRAGMENT_KW => Fragment,
        KERNEL_KW => Kernel,
    ]);

    /// The declarator holding the name and parameter list. It may sit below
    /// pointer or reference declarators when the function returns one.
    pub fn declarator(&self) -> Option<FunctionDeclarator> {
        self.0
            .children()
            .filter(|child| {
                child.kind() != SyntaxKind::COMPOUND_STATEMENT && !TypeRef::can_cast(child.kind())
            })
            .find_map(|child| child.descendants().find_map(FunctionDeclarator::cast))
    }

    pub fn name(&self) -> Option<SmolStr> {
        self.declarator()?.name()?.text()
    }

    pub fn parameters(&self) -> Vec<ParameterDeclaration> {
        self.declarator()
            .and_then(|decl| decl.parameter_list())
            .map(|list| list.parameters().collect())
            .unwrap_or_default()
    }

    /// `device float4* f()` returns a pointer
    pub fn returns_pointer(&self) -> bool {
        declarator_has(&self.0, SyntaxKind::POINTER_DECLARATOR)
    }

    /// Attributes written in front of the function, such as
    /// `[[early_fragment_tests]]`
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.attribute_specifiers()
            .flat_map(|specifier| specifier.attributes().collect::<Vec<_>>())
    }

    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes().find(|attr| attr.name().as_deref() == Some(name))
    }
}

ast_node!(FunctionDeclarator, FUNCTION_DECLARATOR);

impl FunctionDeclarator {
    first_child_method!(name, Name);
    first_child_method!(parameter_list, ParameterList);
}

ast_node!(ParameterList, PARAMETER_LIST);

impl ParameterList {
    children_method!(parameters, ParameterDeclaration);
}

ast_node!(ParameterDeclaration, PARAMETER);

impl ParameterDeclaration {
    first_child_method!(ty, TypeRef);
    children_method!(attribute_specifiers, AttributeSpecifier);
    has_token_method!(is_const, CONST_KW, "device const float* a");
    address_space_method!();

    /// `None` for unnamed parameters such as `float`
    pub fn name(&self) -> Option<SmolStr> {
        declarator_name(&self.0)?.text()
    }

    pub fn is_pointer(&self) -> bool {
        declarator_has(&self.0, SyntaxKind::POINTER_DECLARATOR)
    }

    pub fn is_reference(&self) -> bool {
        declarator_has(&self.0, SyntaxKind::REFERENCE_DECLARATOR)
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.attribute_specifiers()
            .flat_map(|specifier| specifier.attributes().collect::<Vec<_>>())
    }

    /// Attribute by name, e.g. `buffer` in `[[buffer(0)]]`
    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes().find(|attr| attr.name().as_deref() == Some(name))
    }

    /// Argument table slot: the index of `[[buffer(n)]]`, `[[texture(n)]]`
    /// or `[[sampler(n)]]`
    pub fn binding(&self) -> Option<(SmolStr, u32)> {
        self.attributes().find_map(|attr| {
            let name = attr.name()?;
            if matches!(name.as_str(), "buffer" | "texture" | "sampler") {
                attr.index().map(|index| (name, index))
            } else {
                None
            }
        })
    }
}

// ============================================================================
// Attributes
// ============================================================================

ast_node!(AttributeSpecifier, ATTRIBUTE_SPECIFIER);

impl AttributeSpecifier {
    children_method!(attributes, Attribute);
}

ast_node!(Attribute, ATTRIBUTE);

impl Attribute {
    first_child_method!(arg_list, ArgList);

    /// Attribute names may be keywords or builtin type names
    /// (`[[threadgroup(0)]]`, `[[texture(1)]]`), so take the first token
    pub fn name(&self) -> Option<SmolStr> {
        significant_tokens(&self.0)
            .next()
            .map(|t| SmolStr::new(t.text()))
    }

    pub fn arguments(&self) -> Vec<Expression> {
        self.arg_list()
            .map(|list| list.args().collect())
            .unwrap_or_default()
    }

    /// The single integer argument, `0` in `[[buffer(0)]]`
    pub fn index(&self) -> Option<u32> {
        match self.arguments().as_slice() {
            [Expression::Literal(lit)] => lit.as_u32(),
            _ => None,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(Declaration, DECLARATION);

impl Declaration {
    first_child_method!(ty, TypeRef);
    children_method!(declarators, InitDeclarator);
    has_token_method!(is_const, CONST_KW, "const float x = 1.0;");
    has_token_method!(is_constexpr, CONSTEXPR_KW);
    has_token_method!(is_static, STATIC_KW);
    has_token_method!(is_typedef, TYPEDEF_KW, "typedef float4 color;");
    address_space_method!();

    pub fn names(&self) -> Vec<SmolStr> {
        self.declarators().filter_map(|d| d.name()).collect()
    }

    /// `struct S { ... };` and friends declare a type but no variable
    pub fn is_type_only(&self) -> bool {
        self.declarators().next().is_none()
    }
}

ast_node!(InitDeclarator, INIT_DECLARATOR);

impl InitDeclarator {
    first_child_method!(initializer_list, InitializerList);
    children_method!(attribute_specifiers, AttributeSpecifier);

    pub fn name(&self) -> Option<SmolStr> {
        declarator_name(&self.0)?.text()
    }

    /// The `= expr` initializer; `None` for brace initializers
    pub fn initializer(&self) -> Option<Expression> {
        self.0.children().find_map(Expression::cast)
    }

    pub fn is_pointer(&self) -> bool {
        declarator_has(&self.0, SyntaxKind::POINTER_DECLARATOR)
    }

    pub fn is_array(&self) -> bool {
        declarator_has(&self.0, SyntaxKind::ARRAY_DECLARATOR)
    }
}

ast_node!(InitializerList, INITIALIZER_LIST);

impl InitializerList {
    children_method!(elements, Expression);
    children_method!(nested, InitializerList);
}

ast_node!(UsingDeclaration, USING_DECLARATION);

impl UsingDeclaration {
    /// `["metal"]` for `using namespace metal;`
    pub fn path(&self) -> Vec<SmolStr> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| SmolStr::new(t.text()))
            .collect()
    }
}

ast_node!(AliasDeclaration, ALIAS_DECLARATION);

impl AliasDeclaration {
    first_child_method!(ty, TypeRef);

    pub fn name(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }
}

ast_node!(NamespaceDefinition, NAMESPACE_DEFINITION);

impl NamespaceDefinition {
    children_method!(items, Item);

    pub fn name(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }
}
