use super::*;

// ============================================================================
// Expression
// ============================================================================

ast_enum!(
    /// Any expression node
    Expression {
        Assignment(AssignmentExpr) = ASSIGNMENT_EXPR,
        Conditional(ConditionalExpr) = CONDITIONAL_EXPR,
        Binary(BinaryExpr) = BINARY_EXPR,
        Unary(UnaryExpr) = UNARY_EXPR,
        Postfix(PostfixExpr) = POSTFIX_EXPR,
        Cast(CastExpr) = CAST_EXPR,
        Call(CallExpr) = CALL_EXPR,
        Constructor(ConstructorExpr) = CONSTRUCTOR_EXPR,
        Index(IndexExpr) = INDEX_EXPR,
        Field(FieldExpr) = FIELD_EXPR,
        Paren(ParenExpr) = PAREN_EXPR,
        Sizeof(SizeofExpr) = SIZEOF_EXPR,
        Literal(Literal) = LITERAL,
        NameRef(NameRef) = NAME_REF,
    }
);

impl Expression {
    /// Extract all identifier references from this expression
    /// Returns pairs of (identifier_name, text_range)
    pub fn references(&self) -> Vec<(SmolStr, rowan::TextRange)> {
        self.syntax()
            .descendants()
            .filter_map(NameRef::cast)
            .map(|name| (name.path(), name.0.text_range()))
            .collect()
    }

    /// Strip any number of surrounding parentheses
    pub fn unparenthesized(self) -> Expression {
        let mut expr = self;
        while let Expression::Paren(paren) = &expr {
            match paren.inner() {
                Some(inner) => expr = inner,
                None => break,
            }
        }
        expr
    }
}

/// The `n`th expression child of `node`
fn nth_expr(node: &SyntaxNode, n: usize) -> Option<Expression> {
    node.children().filter_map(Expression::cast).nth(n)
}

/// Kind of the first direct operator token
fn operator_kind(node: &SyntaxNode) -> Option<SyntaxKind> {
    significant_tokens(node).next().map(|t| t.kind())
}

// ============================================================================
// Operators
// ============================================================================

ast_node!(AssignmentExpr, ASSIGNMENT_EXPR);

impl AssignmentExpr {
    pub fn lhs(&self) -> Option<Expression> {
        nth_expr(&self.0, 0)
    }

    pub fn rhs(&self) -> Option<Expression> {
        nth_expr(&self.0, 1)
    }

    /// `EQ` for plain assignment, `PLUS_EQ` for `+=` and so on
    pub fn op_kind(&self) -> Option<SyntaxKind> {
        operator_kind(&self.0)
    }

    pub fn is_compound(&self) -> bool {
        self.op_kind().is_some_and(|kind| kind != SyntaxKind::EQ)
    }
}

ast_node!(ConditionalExpr, CONDITIONAL_EXPR);

impl ConditionalExpr {
    pub fn condition(&self) -> Option<Expression> {
        nth_expr(&self.0, 0)
    }

    pub fn then_expr(&self) -> Option<Expression> {
        nth_expr(&self.0, 1)
    }

    pub fn else_expr(&self) -> Option<Expression> {
        nth_expr(&self.0, 2)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expression> {
        nth_expr(&self.0, 0)
    }

    pub fn rhs(&self) -> Option<Expression> {
        nth_expr(&self.0, 1)
    }

    /// `>>` is a joint `>` followed by a plain one in the tree
    pub fn op(&self) -> Option<BinaryOp> {
        let op = match significant_tokens(&self.0).next()?.kind() {
            SyntaxKind::PIPE_PIPE => BinaryOp::LogicalOr,
            SyntaxKind::AMP_AMP => BinaryOp::LogicalAnd,
            SyntaxKind::PIPE => BinaryOp::BitOr,
            SyntaxKind::CARET => BinaryOp::BitXor,
            SyntaxKind::AMP => BinaryOp::BitAnd,
            SyntaxKind::EQ_EQ => BinaryOp::Eq,
            SyntaxKind::BANG_EQ => BinaryOp::Ne,
            SyntaxKind::LT => BinaryOp::Lt,
            SyntaxKind::GT_JOINT => BinaryOp::Shr,
            SyntaxKind::GT => BinaryOp::Gt,
            SyntaxKind::LT_EQ => BinaryOp::Le,
            SyntaxKind::GT_EQ => BinaryOp::Ge,
            SyntaxKind::SHL => BinaryOp::Shl,
            SyntaxKind::PLUS => BinaryOp::Add,
            SyntaxKind::MINUS => BinaryOp::Sub,
            SyntaxKind::STAR => BinaryOp::Mul,
            SyntaxKind::SLASH => BinaryOp::Div,
            SyntaxKind::PERCENT => BinaryOp::Rem,
            _ => return None,
        };
        Some(op)
    }
}

ast_node!(UnaryExpr, UNARY_EXPR);

impl UnaryExpr {
    first_child_method!(operand, Expression);

    /// `MINUS`, `BANG`, `STAR` (dereference), `AMP` (address-of), ...
    pub fn op_kind(&self) -> Option<SyntaxKind> {
        operator_kind(&self.0)
    }
}

ast_node!(PostfixExpr, POSTFIX_EXPR);

impl PostfixExpr {
    first_child_method!(operand, Expression);

    pub fn op_kind(&self) -> Option<SyntaxKind> {
        operator_kind(&self.0)
    }
}

// ============================================================================
// Casts, calls and constructors
// ============================================================================

ast_node!(CastExpr, CAST_EXPR);

impl CastExpr {
    first_child_method!(ty, TypeRef);
    first_child_method!(operand, Expression);

    /// `static_cast`, `reinterpret_cast`, `as_type`, or `None` for a
    /// C-style `(float)x`
    pub fn keyword(&self) -> Option<SyntaxKind> {
        operator_kind(&self.0).filter(|kind| kind.is_keyword())
    }
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    first_child_method!(callee, Expression);
    first_child_method!(arg_list, ArgList);

    /// Name of the called function when the callee is a plain name
    pub fn callee_name(&self) -> Option<SmolStr> {
        match self.callee()? {
            Expression::NameRef(name) => Some(name.path()),
            _ => None,
        }
    }

    pub fn args(&self) -> Vec<Expression> {
        self.arg_list()
            .map(|list| list.args().collect())
            .unwrap_or_default()
    }
}

ast_node!(ConstructorExpr, CONSTRUCTOR_EXPR);

impl ConstructorExpr {
    first_child_method!(ty, BuiltinType);
    first_child_method!(arg_list, ArgList);

    pub fn args(&self) -> Vec<Expression> {
        self.arg_list()
            .map(|list| list.args().collect())
            .unwrap_or_default()
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    children_method!(args, Expression);
}

// ============================================================================
// Access
// ============================================================================

ast_node!(IndexExpr, INDEX_EXPR);

impl IndexExpr {
    pub fn base(&self) -> Option<Expression> {
        nth_expr(&self.0, 0)
    }

    pub fn index(&self) -> Option<Expression> {
        nth_expr(&self.0, 1)
    }
}

ast_node!(FieldExpr, FIELD_EXPR);

impl FieldExpr {
    first_child_method!(base, Expression);
    has_token_method!(is_arrow, ARROW, "p->x");

    /// Member or swizzle name, `xyz` in `v.xyz`
    pub fn field(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }

    /// Whether the member name could be a vector swizzle (`xyzw` or `rgba`,
    /// one to four components, not mixing the two sets)
    pub fn is_swizzle(&self) -> bool {
        let Some(field) = self.field() else {
            return false;
        };
        let len = field.len();
        (1..=4).contains(&len)
            && (field.chars().all(|c| "xyzw".contains(c)) || field.chars().all(|c| "rgba".contains(c)))
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    first_child_method!(inner, Expression);
}

ast_node!(SizeofExpr, SIZEOF_EXPR);

impl SizeofExpr {
    first_child_method!(ty, TypeRef);
}

// ============================================================================
// Leaves
// ============================================================================

/// Literal kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Float,
    String,
    Char,
    Bool,
}

ast_node!(Literal, LITERAL);

impl Literal {
    token_to_enum_method!(kind, LiteralKind, [
        INT_NUMBER => Int,
        FLOAT_NUMBER => Float,
        STRING => String,
        CHAR => Char,
        TRUE_KW => Bool,
        FALSE_KW => Bool,
    ]);

    pub fn token(&self) -> Option<SyntaxToken> {
        significant_tokens(&self.0).next()
    }

    /// Value of a decimal or hexadecimal integer literal, unsigned suffix
    /// allowed
    pub fn as_u32(&self) -> Option<u32> {
        let token = self.token().filter(|t| t.kind() == SyntaxKind::INT_NUMBER)?;
        let text = token.text().trim_end_matches(['u', 'U']);
        match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => text.parse().ok(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.token()?.kind() {
            SyntaxKind::TRUE_KW => Some(true),
            SyntaxKind::FALSE_KW => Some(false),
            _ => None,
        }
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
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
}
