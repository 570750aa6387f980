//! The Metal Shading Language grammar
//!
//! Metal is C++14 plus address-space qualifiers (`device`, `constant`,
//! `threadgroup`, `thread`), shader-stage qualifiers (`vertex`, `fragment`,
//! `kernel`) and `[[attribute]]` annotations, both on declarators and in
//! front of a declaration (`[[early_fragment_tests]] fragment ...`). This grammar
//! covers the declaration, statement and expression forms that shader sources
//! are written in. Templates are limited to the builtin generic types
//! (`texture2d<float, access::read>`, `array<float, 4>`); preprocessor lines
//! are trivia.
//!
//! Two ambiguities are settled by precedence:
//! - `a * b;` at statement level reads as an expression, not a declaration of
//!   a pointer `b` to type `a` (`NAME_REF` outranks `NAMED_TYPE`).
//! - `else` binds to the nearest `if`.

use super::{Grammar, GrammarBuilder};
use crate::parser::SyntaxKind::*;
use crate::seq;

pub fn grammar() -> Grammar {
    let mut g = GrammarBuilder::new();

    // =========================================================================
    // NONTERMINALS
    // =========================================================================
    let program = g.hidden("program");
    let items = g.hidden("items");
    let item = g.hidden("item");
    let function_definition = g.node(FUNCTION_DEFINITION);
    let declaration = g.node(DECLARATION);
    let using_declaration = g.node(USING_DECLARATION);
    let alias_declaration = g.node(ALIAS_DECLARATION);
    let namespace_definition = g.node(NAMESPACE_DEFINITION);

    let specifiers = g.hidden("specifiers");
    let prefixes = g.hidden("prefixes");
    let prefix = g.hidden("prefix");
    let type_specifier = g.hidden("type_specifier");
    let builtin_type = g.node(BUILTIN_TYPE);
    let named_type = g.node(NAMED_TYPE);
    let path = g.hidden("path");
    let template_argument_list = g.node(TEMPLATE_ARG_LIST);
    let template_arguments = g.hidden("template_arguments");
    let template_argument = g.hidden("template_argument");
    let struct_specifier = g.node(STRUCT_SPECIFIER);
    let field_list = g.node(FIELD_LIST);
    let fields = g.hidden("fields");
    let field_declaration = g.node(FIELD_DECLARATION);
    let field_declarators = g.hidden("field_declarators");
    let field_declarator = g.hidden("field_declarator");
    let enum_specifier = g.node(ENUM_SPECIFIER);
    let enum_base = g.hidden("enum_base");
    let enumerator_list = g.node(ENUMERATOR_LIST);
    let enumerators = g.hidden("enumerators");
    let enumerator = g.node(ENUMERATOR);

    let init_declarators = g.hidden("init_declarators");
    let init_declarator = g.node(INIT_DECLARATOR);
    let initializer = g.hidden("initializer");
    let initializer_list = g.node(INITIALIZER_LIST);
    let initializer_items = g.hidden("initializer_items");
    let declarator = g.hidden("declarator");
    let direct_declarator = g.hidden("direct_declarator");
    let name = g.node(NAME);
    let function_declarator = g.node(FUNCTION_DECLARATOR);
    let array_declarator = g.node(ARRAY_DECLARATOR);
    let pointer_declarator = g.node(POINTER_DECLARATOR);
    let reference_declarator = g.node(REFERENCE_DECLARATOR);
    let parameter_list = g.node(PARAMETER_LIST);
    let parameters = g.hidden("parameters");
    let parameter = g.node(PARAMETER);
    let attribute_specifiers = g.hidden("attribute_specifiers");
    let attribute_specifier = g.node(ATTRIBUTE_SPECIFIER);
    let attributes = g.hidden("attributes");
    let attribute = g.node(ATTRIBUTE);
    let attribute_name = g.hidden("attribute_name");

    let compound_statement = g.node(COMPOUND_STATEMENT);
    let statements = g.hidden("statements");
    let statement = g.hidden("statement");
    let expression_statement = g.node(EXPRESSION_STATEMENT);
    let if_statement = g.node(IF_STATEMENT);
    let while_statement = g.node(WHILE_STATEMENT);
    let do_statement = g.node(DO_STATEMENT);
    let for_statement = g.node(FOR_STATEMENT);
    let for_init = g.hidden("for_init");
    let switch_statement = g.node(SWITCH_STATEMENT);
    let case_label = g.node(CASE_LABEL);
    let break_statement = g.node(BREAK_STATEMENT);
    let continue_statement = g.node(CONTINUE_STATEMENT);
    let return_statement = g.node(RETURN_STATEMENT);

    let expression = g.hidden("expression");
    let assignment_expr = g.node(ASSIGNMENT_EXPR);
    let conditional_expr = g.node(CONDITIONAL_EXPR);
    let binary_expr = g.node(BINARY_EXPR);
    let unary_expr = g.node(UNARY_EXPR);
    let postfix_expr = g.node(POSTFIX_EXPR);
    let cast_expr = g.node(CAST_EXPR);
    let call_expr = g.node(CALL_EXPR);
    let constructor_expr = g.node(CONSTRUCTOR_EXPR);
    let index_expr = g.node(INDEX_EXPR);
    let field_expr = g.node(FIELD_EXPR);
    let paren_expr = g.node(PAREN_EXPR);
    let sizeof_expr = g.node(SIZEOF_EXPR);
    let literal = g.node(LITERAL);
    let name_ref = g.node(NAME_REF);
    let argument_list = g.node(ARG_LIST);
    let arguments = g.hidden("arguments");

    // =========================================================================
    // PRECEDENCE (loosest first)
    // =========================================================================
    let type_ref = g.nonassoc(&[]);
    let value_ref = g.nonassoc(&[]);
    let if_without_else = g.nonassoc(&[IF_KW]);
    let _else = g.nonassoc(&[ELSE_KW]);
    let _assignment = g.right(&[EQ, PLUS_EQ, MINUS_EQ, STAR_EQ, SLASH_EQ, PERCENT_EQ, AMP_EQ, PIPE_EQ, CARET_EQ, SHL_EQ, SHR_EQ]);
    let ternary = g.right(&[QUESTION]);
    let _logical_or = g.left(&[PIPE_PIPE]);
    let _logical_and = g.left(&[AMP_AMP]);
    let _bit_or = g.left(&[PIPE]);
    let _bit_xor = g.left(&[CARET]);
    let _bit_and = g.left(&[AMP]);
    let _equality = g.left(&[EQ_EQ, BANG_EQ]);
    let _relational = g.left(&[LT, GT, LT_EQ, GT_EQ]);
    let shift = g.left(&[SHL, GT_JOINT]);
    let _additive = g.left(&[PLUS, MINUS]);
    let _multiplicative = g.left(&[STAR, SLASH, PERCENT]);
    let unary = g.right(&[BANG, TILDE]);
    let _postfix = g.left(&[L_PAREN, L_BRACKET, DOT, ARROW, PLUS_PLUS, MINUS_MINUS]);

    // =========================================================================
    // ITEMS
    // =========================================================================
    g.rule(program, seq![]);
    g.rule(program, seq![items]);
    g.rule(items, seq![item]);
    g.rule(items, seq![items, item]);
    g.rule(item, seq![function_definition]);
    g.rule(item, seq![declaration]);
    g.rule(item, seq![using_declaration]);
    g.rule(item, seq![alias_declaration]);
    g.rule(item, seq![namespace_definition]);

    g.rule(function_definition, seq![specifiers, declarator, compound_statement]);
    g.rule(function_definition, seq![attribute_specifiers, specifiers, declarator, compound_statement]);
    g.rule(declaration, seq![specifiers, SEMICOLON]);
    g.rule(declaration, seq![specifiers, init_declarators, SEMICOLON]);
    g.rule(declaration, seq![attribute_specifiers, specifiers, SEMICOLON]);
    g.rule(declaration, seq![attribute_specifiers, specifiers, init_declarators, SEMICOLON]);
    g.rule(using_declaration, seq![USING_KW, NAMESPACE_KW, path, SEMICOLON]);
    g.rule(alias_declaration, seq![USING_KW, IDENT, EQ, specifiers, SEMICOLON]);
    g.rule(namespace_definition, seq![NAMESPACE_KW, IDENT, L_BRACE, R_BRACE]);
    g.rule(namespace_definition, seq![NAMESPACE_KW, IDENT, L_BRACE, items, R_BRACE]);

    // =========================================================================
    // TYPES
    // =========================================================================
    g.rule(specifiers, seq![type_specifier]);
    g.rule(specifiers, seq![prefixes, type_specifier]);
    g.rule(prefixes, seq![prefix]);
    g.rule(prefixes, seq![prefixes, prefix]);
    g.rule(prefix, seq![CONST_KW]);
    g.rule(prefix, seq![CONSTEXPR_KW]);
    g.rule(prefix, seq![CONSTANT_KW]);
    g.rule(prefix, seq![DEVICE_KW]);
    g.rule(prefix, seq![THREADGROUP_KW]);
    g.rule(prefix, seq![THREADGROUP_IMAGEBLOCK_KW]);
    g.rule(prefix, seq![THREAD_KW]);
    g.rule(prefix, seq![STATIC_KW]);
    g.rule(prefix, seq![INLINE_KW]);
    g.rule(prefix, seq![VOLATILE_KW]);
    g.rule(prefix, seq![EXTERN_KW]);
    g.rule(prefix, seq![TYPEDEF_KW]);
    g.rule(prefix, seq![VERTEX_KW]);
    g.rule(prefix, seq![FRAGMENT_KW]);
    g.rule(prefix, seq![KERNEL_KW]);

    g.rule(type_specifier, seq![builtin_type]);
    g.rule(type_specifier, seq![named_type]);
    g.rule(type_specifier, seq![struct_specifier]);
    g.rule(type_specifier, seq![enum_specifier]);
    g.rule(builtin_type, seq![PRIMITIVE_TYPE]);
    g.rule(builtin_type, seq![PRIMITIVE_TYPE, template_argument_list]);
    g.rule_prec(named_type, type_ref, seq![path]);
    g.rule(path, seq![IDENT]);
    g.rule(path, seq![path, COLON_COLON, IDENT]);
    g.rule(template_argument_list, seq![LT, template_arguments, GT]);
    g.rule(template_argument_list, seq![LT, template_arguments, GT_JOINT]);
    g.rule(template_arguments, seq![template_argument]);
    g.rule(template_arguments, seq![template_arguments, COMMA, template_argument]);
    g.rule(template_argument, seq![specifiers]);
    g.rule(template_argument, seq![INT_NUMBER]);

    g.rule(struct_specifier, seq![STRUCT_KW, IDENT]);
    g.rule(struct_specifier, seq![STRUCT_KW, IDENT, field_list]);
    g.rule(struct_specifier, seq![STRUCT_KW, field_list]);
    g.rule(field_list, seq![L_BRACE, R_BRACE]);
    g.rule(field_list, seq![L_BRACE, fields, R_BRACE]);
    g.rule(fields, seq![field_declaration]);
    g.rule(fields, seq![fields, field_declaration]);
    g.rule(field_declaration, seq![specifiers, field_declarators, SEMICOLON]);
    g.rule(field_declarators, seq![field_declarator]);
    g.rule(field_declarators, seq![field_declarators, COMMA, field_declarator]);
    g.rule(field_declarator, seq![declarator]);
    g.rule(field_declarator, seq![declarator, attribute_specifier]);

    g.rule(enum_specifier, seq![ENUM_KW, IDENT]);
    g.rule(enum_specifier, seq![ENUM_KW, enumerator_list]);
    g.rule(enum_specifier, seq![ENUM_KW, IDENT, enumerator_list]);
    g.rule(enum_specifier, seq![ENUM_KW, IDENT, COLON, enum_base, enumerator_list]);
    g.rule(enum_specifier, seq![ENUM_KW, CLASS_KW, IDENT, enumerator_list]);
    g.rule(enum_specifier, seq![ENUM_KW, CLASS_KW, IDENT, COLON, enum_base, enumerator_list]);
    g.rule(enum_base, seq![builtin_type]);
    g.rule(enum_base, seq![named_type]);
    g.rule(enumerator_list, seq![L_BRACE, R_BRACE]);
    g.rule(enumerator_list, seq![L_BRACE, enumerators, R_BRACE]);
    g.rule(enumerator_list, seq![L_BRACE, enumerators, COMMA, R_BRACE]);
    g.rule(enumerators, seq![enumerator]);
    g.rule(enumerators, seq![enumerators, COMMA, enumerator]);
    g.rule(enumerator, seq![IDENT]);
    g.rule(enumerator, seq![IDENT, EQ, expression]);

    // =========================================================================
    // DECLARATORS
    // =========================================================================
    g.rule(init_declarators, seq![init_declarator]);
    g.rule(init_declarators, seq![init_declarators, COMMA, init_declarator]);
    g.rule(init_declarator, seq![declarator]);
    g.rule(init_declarator, seq![declarator, attribute_specifier]);
    g.rule(init_declarator, seq![declarator, EQ, initializer]);
    g.rule(init_declarator, seq![declarator, attribute_specifier, EQ, initializer]);
    g.rule(initializer, seq![expression]);
    g.rule(initializer, seq![initializer_list]);
    g.rule(initializer_list, seq![L_BRACE, R_BRACE]);
    g.rule(initializer_list, seq![L_BRACE, initializer_items, R_BRACE]);
    g.rule(initializer_list, seq![L_BRACE, initializer_items, COMMA, R_BRACE]);
    g.rule(initializer_items, seq![initializer]);
    g.rule(initializer_items, seq![initializer_items, COMMA, initializer]);

    g.rule(declarator, seq![direct_declarator]);
    g.rule(declarator, seq![pointer_declarator]);
    g.rule(declarator, seq![reference_declarator]);
    g.rule(pointer_declarator, seq![STAR, declarator]);
    g.rule(pointer_declarator, seq![STAR, prefixes, declarator]);
    g.rule(reference_declarator, seq![AMP, declarator]);
    g.rule(direct_declarator, seq![name]);
    g.rule(direct_declarator, seq![function_declarator]);
    g.rule(direct_declarator, seq![array_declarator]);
    g.rule(name, seq![IDENT]);
    g.rule(function_declarator, seq![name, parameter_list]);
    g.rule(array_declarator, seq![direct_declarator, L_BRACKET, R_BRACKET]);
    g.rule(array_declarator, seq![direct_declarator, L_BRACKET, expression, R_BRACKET]);

    g.rule(parameter_list, seq![L_PAREN, R_PAREN]);
    g.rule(parameter_list, seq![L_PAREN, parameters, R_PAREN]);
    g.rule(parameters, seq![parameter]);
    g.rule(parameters, seq![parameters, COMMA, parameter]);
    g.rule(parameter, seq![specifiers]);
    g.rule(parameter, seq![specifiers, attribute_specifier]);
    g.rule(parameter, seq![specifiers, declarator]);
    g.rule(parameter, seq![specifiers, declarator, attribute_specifier]);

    g.rule(attribute_specifiers, seq![attribute_specifier]);
    g.rule(attribute_specifiers, seq![attribute_specifiers, attribute_specifier]);
    g.rule(attribute_specifier, seq![L_ATTR, attributes, R_BRACKET, R_BRACKET]);
    g.rule(attributes, seq![attribute]);
    g.rule(attributes, seq![attributes, COMMA, attribute]);
    g.rule(attribute, seq![attribute_name]);
    g.rule(attribute, seq![attribute_name, argument_list]);
    g.rule(attribute_name, seq![IDENT]);
    g.rule(attribute_name, seq![PRIMITIVE_TYPE]);
    g.rule(attribute_name, seq![THREADGROUP_KW]);
    g.rule(attribute_name, seq![VERTEX_KW]);
    g.rule(attribute_name, seq![FRAGMENT_KW]);
    g.rule(attribute_name, seq![KERNEL_KW]);

    // =========================================================================
    // STATEMENTS
    // =========================================================================
    g.rule(compound_statement, seq![L_BRACE, R_BRACE]);
    g.rule(compound_statement, seq![L_BRACE, statements, R_BRACE]);
    g.rule(statements, seq![statement]);
    g.rule(statements, seq![statements, statement]);
    g.rule(statement, seq![compound_statement]);
    g.rule(statement, seq![declaration]);
    g.rule(statement, seq![expression_statement]);
    g.rule(statement, seq![if_statement]);
    g.rule(statement, seq![while_statement]);
    g.rule(statement, seq![do_statement]);
    g.rule(statement, seq![for_statement]);
    g.rule(statement, seq![switch_statement]);
    g.rule(statement, seq![case_label]);
    g.rule(statement, seq![break_statement]);
    g.rule(statement, seq![continue_statement]);
    g.rule(statement, seq![return_statement]);

    g.rule(expression_statement, seq![SEMICOLON]);
    g.rule(expression_statement, seq![expression, SEMICOLON]);
    g.rule_prec(if_statement, if_without_else, seq![IF_KW, L_PAREN, expression, R_PAREN, statement]);
    g.rule(if_statement, seq![IF_KW, L_PAREN, expression, R_PAREN, statement, ELSE_KW, statement]);
    g.rule(while_statement, seq![WHILE_KW, L_PAREN, expression, R_PAREN, statement]);
    g.rule(do_statement, seq![DO_KW, statement, WHILE_KW, L_PAREN, expression, R_PAREN, SEMICOLON]);
    g.rule(for_statement, seq![FOR_KW, L_PAREN, for_init, SEMICOLON, R_PAREN, statement]);
    g.rule(for_statement, seq![FOR_KW, L_PAREN, for_init, expression, SEMICOLON, R_PAREN, statement]);
    g.rule(for_statement, seq![FOR_KW, L_PAREN, for_init, SEMICOLON, expression, R_PAREN, statement]);
    g.rule(for_statement, seq![FOR_KW, L_PAREN, for_init, expression, SEMICOLON, expression, R_PAREN, statement]);
    g.rule(for_init, seq![declaration]);
    g.rule(for_init, seq![expression_statement]);
    g.rule(switch_statement, seq![SWITCH_KW, L_PAREN, expression, R_PAREN, compound_statement]);
    g.rule(case_label, seq![CASE_KW, expression, COLON]);
    g.rule(case_label, seq![DEFAULT_KW, COLON]);
    g.rule(break_statement, seq![BREAK_KW, SEMICOLON]);
    g.rule(continue_statement, seq![CONTINUE_KW, SEMICOLON]);
    g.rule(return_statement, seq![RETURN_KW, SEMICOLON]);
    g.rule(return_statement, seq![RETURN_KW, expression, SEMICOLON]);

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================
    g.rule(expression, seq![assignment_expr]);
    g.rule(expression, seq![conditional_expr]);
    g.rule(expression, seq![binary_expr]);
    g.rule(expression, seq![unary_expr]);
    g.rule(expression, seq![postfix_expr]);
    g.rule(expression, seq![cast_expr]);
    g.rule(expression, seq![call_expr]);
    g.rule(expression, seq![constructor_expr]);
    g.rule(expression, seq![index_expr]);
    g.rule(expression, seq![field_expr]);
    g.rule(expression, seq![paren_expr]);
    g.rule(expression, seq![sizeof_expr]);
    g.rule(expression, seq![literal]);
    g.rule(expression, seq![name_ref]);

    g.rule(assignment_expr, seq![expression, EQ, expression]);
    g.rule(assignment_expr, seq![expression, PLUS_EQ, expression]);
    g.rule(assignment_expr, seq![expression, MINUS_EQ, expression]);
    g.rule(assignment_expr, seq![expression, STAR_EQ, expression]);
    g.rule(assignment_expr, seq![expression, SLASH_EQ, expression]);
    g.rule(assignment_expr, seq![expression, PERCENT_EQ, expression]);
    g.rule(assignment_expr, seq![expression, AMP_EQ, expression]);
    g.rule(assignment_expr, seq![expression, PIPE_EQ, expression]);
    g.rule(assignment_expr, seq![expression, CARET_EQ, expression]);
    g.rule(assignment_expr, seq![expression, SHL_EQ, expression]);
    g.rule(assignment_expr, seq![expression, SHR_EQ, expression]);
    g.rule_prec(conditional_expr, ternary, seq![expression, QUESTION, expression, COLON, expression]);

    g.rule(binary_expr, seq![expression, PIPE_PIPE, expression]);
    g.rule(binary_expr, seq![expression, AMP_AMP, expression]);
    g.rule(binary_expr, seq![expression, PIPE, expression]);
    g.rule(binary_expr, seq![expression, CARET, expression]);
    g.rule(binary_expr, seq![expression, AMP, expression]);
    g.rule(binary_expr, seq![expression, EQ_EQ, expression]);
    g.rule(binary_expr, seq![expression, BANG_EQ, expression]);
    g.rule(binary_expr, seq![expression, LT, expression]);
    g.rule(binary_expr, seq![expression, GT, expression]);
    g.rule(binary_expr, seq![expression, LT_EQ, expression]);
    g.rule(binary_expr, seq![expression, GT_EQ, expression]);
    g.rule(binary_expr, seq![expression, SHL, expression]);
    g.rule_prec(binary_expr, shift, seq![expression, GT_JOINT, GT, expression]);
    g.rule(binary_expr, seq![expression, PLUS, expression]);
    g.rule(binary_expr, seq![expression, MINUS, expression]);
    g.rule(binary_expr, seq![expression, STAR, expression]);
    g.rule(binary_expr, seq![expression, SLASH, expression]);
    g.rule(binary_expr, seq![expression, PERCENT, expression]);

    g.rule_prec(unary_expr, unary, seq![MINUS, expression]);
    g.rule_prec(unary_expr, unary, seq![PLUS, expression]);
    g.rule_prec(unary_expr, unary, seq![BANG, expression]);
    g.rule_prec(unary_expr, unary, seq![TILDE, expression]);
    g.rule_prec(unary_expr, unary, seq![STAR, expression]);
    g.rule_prec(unary_expr, unary, seq![AMP, expression]);
    g.rule_prec(unary_expr, unary, seq![PLUS_PLUS, expression]);
    g.rule_prec(unary_expr, unary, seq![MINUS_MINUS, expression]);
    g.rule(postfix_expr, seq![expression, PLUS_PLUS]);
    g.rule(postfix_expr, seq![expression, MINUS_MINUS]);

    g.rule_prec(cast_expr, unary, seq![L_PAREN, builtin_type, R_PAREN, expression]);
    g.rule(cast_expr, seq![STATIC_CAST_KW, LT, specifiers, GT, L_PAREN, expression, R_PAREN]);
    g.rule(cast_expr, seq![REINTERPRET_CAST_KW, LT, specifiers, GT, L_PAREN, expression, R_PAREN]);
    g.rule(cast_expr, seq![AS_TYPE_KW, LT, specifiers, GT, L_PAREN, expression, R_PAREN]);
    g.rule(call_expr, seq![expression, argument_list]);
    g.rule(constructor_expr, seq![builtin_type, argument_list]);
    g.rule(index_expr, seq![expression, L_BRACKET, expression, R_BRACKET]);
    g.rule(field_expr, seq![expression, DOT, IDENT]);
    g.rule(field_expr, seq![expression, ARROW, IDENT]);
    g.rule(paren_expr, seq![L_PAREN, expression, R_PAREN]);
    g.rule(sizeof_expr, seq![SIZEOF_KW, L_PAREN, specifiers, R_PAREN]);
    g.rule(literal, seq![INT_NUMBER]);
    g.rule(literal, seq![FLOAT_NUMBER]);
    g.rule(literal, seq![STRING]);
    g.rule(literal, seq![CHAR]);
    g.rule(literal, seq![TRUE_KW]);
    g.rule(literal, seq![FALSE_KW]);
    g.rule_prec(name_ref, value_ref, seq![path]);

    g.rule(argument_list, seq![L_PAREN, R_PAREN]);
    g.rule(argument_list, seq![L_PAREN, arguments, R_PAREN]);
    g.rule(arguments, seq![expression]);
    g.rule(arguments, seq![arguments, COMMA, expression]);

    g.build(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_is_valid() {
        assert_eq!(grammar().validate(), Ok(()));
    }

    #[test]
    fn test_every_node_kind_is_declared_once() {
        let grammar = grammar();
        let mut kinds: Vec<_> = grammar
            .nonterminals()
            .iter()
            .filter_map(|info| info.node)
            .collect();
        let count = kinds.len();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), count);
    }
}
