//! Debug document for a parsed program, printed by `--dump-ast`.

use serde_json::{Value, json};

use crate::ast::{ClassMemberKind, Expr, ExprKind, Program, RoutineDecl, RoutineKind, Stmt, Visibility};

pub fn program_to_json(program: &Program) -> Value {
    json!({
        "kind": "Program",
        "body": statements(&program.body),
    })
}

fn statements(body: &[Stmt]) -> Value {
    Value::Array(body.iter().map(stmt_to_json).collect())
}

fn routine_to_json(decl: &RoutineDecl) -> Value {
    let kind = match decl.kind {
        RoutineKind::Function => "FunctionDeclaration",
        RoutineKind::Procedure => "ProcedureDeclaration",
    };
    json!({
        "kind": kind,
        "identifier": decl.name.as_ref(),
        "parameters": decl.params.iter().map(|p| p.as_ref()).collect::<Vec<_>>(),
        "body": statements(&decl.body),
    })
}

pub fn stmt_to_json(stmt: &Stmt) -> Value {
    match stmt {
        Stmt::Let { name, value, .. } => json!({
            "kind": "VariableDeclaration",
            "identifier": name.as_ref(),
            "value": expr_to_json(value),
        }),
        Stmt::Array { name, dimensions, .. } => json!({
            "kind": "ArrayDeclaration",
            "identifier": name.as_ref(),
            "dimensions": dimensions.iter().map(expr_to_json).collect::<Vec<_>>(),
        }),
        Stmt::Routine(decl) => routine_to_json(decl),
        Stmt::Class(decl) => {
            let members: Vec<Value> = decl
                .members
                .iter()
                .map(|member| {
                    let visibility = match member.visibility {
                        Visibility::Public => "public",
                        Visibility::Private => "private",
                    };
                    match &member.kind {
                        ClassMemberKind::Attribute(name) => json!({
                            "kind": "Attribute",
                            "identifier": name.as_ref(),
                            "visibility": visibility,
                        }),
                        ClassMemberKind::Routine(routine) => {
                            let mut node = routine_to_json(routine);
                            node["visibility"] = json!(visibility);
                            node
                        }
                    }
                })
                .collect();
            json!({
                "kind": "ClassDeclaration",
                "identifier": decl.name.as_ref(),
                "parent": decl.parent.as_ref().map(|(name, _)| name.as_ref()),
                "members": members,
            })
        }
        Stmt::If { condition, then_branch, else_branch } => json!({
            "kind": "IfStatement",
            "condition": expr_to_json(condition),
            "then": statements(then_branch),
            "else": else_branch.as_deref().map(statements),
        }),
        Stmt::Switch { discriminant, cases } => json!({
            "kind": "SwitchStatement",
            "discriminant": expr_to_json(discriminant),
            "cases": cases
                .iter()
                .map(|case| json!({
                    "kind": "CaseStatement",
                    "test": case.test.as_ref().map(expr_to_json),
                    "then": statements(&case.body),
                }))
                .collect::<Vec<_>>(),
        }),
        Stmt::For { var, start, end, body, .. } => json!({
            "kind": "ForLoop",
            "variable": var.as_ref(),
            "initial_value": expr_to_json(start),
            "end_value": expr_to_json(end),
            "body": statements(body),
        }),
        Stmt::While { condition, body, .. } => json!({
            "kind": "WhileLoop",
            "condition": expr_to_json(condition),
            "body": statements(body),
        }),
        Stmt::DoUntil { body, condition } => json!({
            "kind": "DoUntilLoop",
            "body": statements(body),
            "condition": expr_to_json(condition),
        }),
        Stmt::Return { value, .. } => json!({
            "kind": "ReturnStatement",
            "value": value.as_ref().map(expr_to_json),
        }),
        Stmt::Expr(expr) => expr_to_json(expr),
    }
}

pub fn expr_to_json(expr: &Expr) -> Value {
    match &expr.kind {
        ExprKind::Identifier(name) => json!({ "kind": "Identifier", "symbol": name.as_ref() }),
        ExprKind::Integer(value) => json!({ "kind": "NumericLiteral", "value": value }),
        ExprKind::Float(value) => json!({ "kind": "FloatLiteral", "value": value }),
        ExprKind::String(value) => json!({ "kind": "StringLiteral", "value": value.as_ref() }),
        ExprKind::Null => json!({ "kind": "NullLiteral" }),
        ExprKind::Assignment { target, value } => json!({
            "kind": "AssignmentExpression",
            "assign_to": expr_to_json(target),
            "value": expr_to_json(value),
        }),
        ExprKind::Binary { left, op, right } => json!({
            "kind": "BinaryExpression",
            "left": expr_to_json(left),
            "operator": op.symbol(),
            "right": expr_to_json(right),
        }),
        ExprKind::Unary { op, expr } => json!({
            "kind": "UnaryExpression",
            "operator": op.symbol(),
            "operand": expr_to_json(expr),
        }),
        ExprKind::Range { start, end } => json!({
            "kind": "RangeExpression",
            "start": expr_to_json(start),
            "end": expr_to_json(end),
        }),
        ExprKind::FieldAccess { object, field } => json!({
            "kind": "MemberExpression",
            "object": expr_to_json(object),
            "property": { "kind": "Identifier", "symbol": field.as_ref() },
            "computed": false,
        }),
        ExprKind::Index { object, index } => json!({
            "kind": "MemberExpression",
            "object": expr_to_json(object),
            "property": expr_to_json(index),
            "computed": true,
        }),
        ExprKind::Call { callee, args } => json!({
            "kind": "CallExpression",
            "caller": expr_to_json(callee),
            "arguments": args.iter().map(expr_to_json).collect::<Vec<_>>(),
        }),
        ExprKind::New { class, args } => json!({
            "kind": "NewExpression",
            "class": expr_to_json(class),
            "arguments": args.iter().map(expr_to_json).collect::<Vec<_>>(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::parse;

    #[test]
    fn test_every_node_has_kind() {
        let program = parse("let total = 0\nfor i = 1 to 3\n total = total + i\nnext i\nprint(total)").unwrap();
        let document = program_to_json(&program);
        assert_eq!(document["kind"], "Program");
        assert_eq!(document["body"][0]["kind"], "VariableDeclaration");
        assert_eq!(document["body"][1]["kind"], "ForLoop");
        assert_eq!(document["body"][1]["body"][0]["kind"], "AssignmentExpression");
        assert_eq!(document["body"][2]["kind"], "CallExpression");
    }

    #[test]
    fn test_member_expression_marks_computed() {
        let program = parse("grid[1].length").unwrap();
        let document = program_to_json(&program);
        let member = &document["body"][0];
        assert_eq!(member["kind"], "MemberExpression");
        assert_eq!(member["computed"], false);
        assert_eq!(member["object"]["computed"], true);
    }

    #[test]
    fn test_class_members_keep_visibility() {
        let program = parse("class A\n private x\n public function get()\n  return x\n endfunction\nendclass").unwrap();
        let document = program_to_json(&program);
        let members = &document["body"][0]["members"];
        assert_eq!(members[0]["visibility"], "private");
        assert_eq!(members[1]["kind"], "FunctionDeclaration");
        assert_eq!(members[1]["visibility"], "public");
    }
}
