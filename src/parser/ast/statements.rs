use super::*;

// ============================================================================
// Statements
// ============================================================================

ast_enum!(
    /// Any statement that can appear in a function body
    Statement {
        Compound(CompoundStatement) = COMPOUND_STATEMENT,
        Declaration(Declaration) = DECLARATION,
        Expression(ExpressionStatement) = EXPRESSION_STATEMENT,
        If(IfStatement) = IF_STATEMENT,
        While(WhileStatement) = WHILE_STATEMENT,
        Do(DoStatement) = DO_STATEMENT,
        For(ForStatement) = FOR_STATEMENT,
        Switch(SwitchStatement) = SWITCH_STATEMENT,
        Case(CaseLabel) = CASE_LABEL,
        Break(BreakStatement) = BREAK_STATEMENT,
        Continue(ContinueStatement) = CONTINUE_STATEMENT,
        Return(ReturnStatement) = RETURN_STATEMENT,
    }
);

ast_node!(CompoundStatement, COMPOUND_STATEMENT);

impl CompoundStatement {
    children_method!(statements, Statement);
    descendants_method!(returns, ReturnStatement, "Every return statement in this block, nested ones included.");

    /// `{` and `}` are both present and not inserted by recovery
    pub fn is_closed(&self) -> bool {
        has_token(&self.0, SyntaxKind::L_BRACE) && has_token(&self.0, SyntaxKind::R_BRACE)
    }
}

ast_node!(ExpressionStatement, EXPRESSION_STATEMENT);

impl ExpressionStatement {
    first_child_method!(expr, Expression);

    /// A lone `;`
    pub fn is_empty(&self) -> bool {
        self.expr().is_none()
    }
}

ast_node!(IfStatement, IF_STATEMENT);

impl IfStatement {
    first_child_method!(condition, Expression);

    pub fn then_branch(&self) -> Option<Statement> {
        let (before, _) = split_at_token::<Statement>(&self.0, SyntaxKind::ELSE_KW);
        before.into_iter().next()
    }

    pub fn else_branch(&self) -> Option<Statement> {
        let (_, after) = split_at_token::<Statement>(&self.0, SyntaxKind::ELSE_KW);
        after.into_iter().next()
    }
}

ast_node!(WhileStatement, WHILE_STATEMENT);

impl WhileStatement {
    first_child_method!(condition, Expression);
    first_child_method!(body, Statement);
}

ast_node!(DoStatement, DO_STATEMENT);

impl DoStatement {
    first_child_method!(body, Statement);
    first_child_method!(condition, Expression);
}

ast_node!(ForStatement, FOR_STATEMENT);

impl ForStatement {
    /// `for (init; condition; step) body`. The init part is a declaration or
    /// an expression statement and carries the first `;` itself.
    pub fn init(&self) -> Option<Statement> {
        let (header, _) = split_at_token::<Statement>(&self.0, SyntaxKind::R_PAREN);
        header.into_iter().next()
    }

    pub fn condition(&self) -> Option<Expression> {
        let (before, _) = split_at_token::<Expression>(&self.0, SyntaxKind::SEMICOLON);
        before.into_iter().next()
    }

    pub fn step(&self) -> Option<Expression> {
        let (_, after) = split_at_token::<Expression>(&self.0, SyntaxKind::SEMICOLON);
        after.into_iter().next()
    }

    pub fn body(&self) -> Option<Statement> {
        let (_, after) = split_at_token::<Statement>(&self.0, SyntaxKind::R_PAREN);
        after.into_iter().next()
    }
}

ast_node!(SwitchStatement, SWITCH_STATEMENT);

impl SwitchStatement {
    first_child_method!(condition, Expression);
    first_child_method!(body, CompoundStatement);

    pub fn cases(&self) -> impl Iterator<Item = CaseLabel> + use<> {
        self.body()
            .into_iter()
            .flat_map(|body| body.statements().collect::<Vec<_>>())
            .filter_map(|stmt| match stmt {
                Statement::Case(label) => Some(label),
                _ => None,
            })
    }
}

ast_node!(CaseLabel, CASE_LABEL);

impl CaseLabel {
    first_child_method!(value, Expression);
    has_token_method!(is_default, DEFAULT_KW, "default:");
}

ast_node!(BreakStatement, BREAK_STATEMENT);
ast_node!(ContinueStatement, CONTINUE_STATEMENT);

ast_node!(ReturnStatement, RETURN_STATEMENT);

impl ReturnStatement {
    first_child_method!(value, Expression);
}

/// Split children of a node at the first token of `kind`.
///
/// Returns `(before, after)` where:
/// - `before` contains all nodes of type `T` before the token
/// - `after` contains all nodes of type `T` after it
fn split_at_token<T: AstNode>(node: &SyntaxNode, kind: SyntaxKind) -> (Vec<T>, Vec<T>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut found = false;

    for elem in node.children_with_tokens() {
        match elem {
            rowan::NodeOrToken::Token(token) => {
                if token.kind() == kind {
                    found = true;
                }
            }
            rowan::NodeOrToken::Node(child) => {
                if let Some(item) = T::cast(child) {
                    if found {
                        after.push(item);
                    } else {
                        before.push(item);
                    }
                }
            }
        }
    }
    (before, after)
}
