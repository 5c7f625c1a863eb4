//! Two-stack infix evaluation.
//!
//! Operands go on one stack, operators and open parentheses on the other.
//! An operator first reduces every pending operator of equal or higher
//! precedence, `)` reduces back to its `(`, and end of input drains whatever
//! is left.
//!
//! Operand order matters for `-` and `/`: when reducing, the value popped
//! first is the right-hand side and the value popped second (the one that
//! arrived earlier) is the left-hand side, so `a - b` computes `a - b`.

use super::error::EvalError;
use super::token::{Op, Token};

#[derive(Debug, Clone, Copy)]
enum Pending {
    Open,
    Apply(Op),
}

/// Evaluate a validated token sequence.
///
/// The first error (undefined variable or division by zero) ends evaluation
/// and becomes the result.
pub(crate) fn evaluate_tokens<L>(tokens: &[Token], lookup: L) -> Result<f64, EvalError>
where
    L: Fn(&str) -> Option<f64>,
{
    let mut operands: Vec<f64> = Vec::with_capacity(tokens.len() / 2 + 1);
    let mut operators: Vec<Pending> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(n) => operands.push(*n),
            Token::Variable(name) => {
                let value =
                    lookup(name).ok_or_else(|| EvalError::UndefinedVariable(name.clone()))?;
                operands.push(value);
            }
            Token::LParen => operators.push(Pending::Open),
            Token::RParen => {
                while let Some(pending) = operators.pop() {
                    match pending {
                        Pending::Apply(op) => reduce(&mut operands, op)?,
                        Pending::Open => break,
                    }
                }
            }
            Token::Op(op) => {
                while let Some(&Pending::Apply(top)) = operators.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    operators.pop();
                    reduce(&mut operands, top)?;
                }
                operators.push(Pending::Apply(*op));
            }
        }
    }

    while let Some(pending) = operators.pop() {
        if let Pending::Apply(op) = pending {
            reduce(&mut operands, op)?;
        }
    }

    debug_assert_eq!(operands.len(), 1, "validated expression leaves one operand");
    Ok(operands.pop().unwrap_or_default())
}

/// Pop two operands, apply `op` as `left op right`, push the result.
fn reduce(operands: &mut Vec<f64>, op: Op) -> Result<(), EvalError> {
    // The grammar guarantees two operands for every binary operator.
    let right = operands.pop().unwrap_or_default();
    let left = operands.pop().unwrap_or_default();
    operands.push(apply(left, op, right)?);
    Ok(())
}

fn apply(left: f64, op: Op, right: f64) -> Result<f64, EvalError> {
    match op {
        Op::Add => Ok(left + right),
        Op::Sub => Ok(left - right),
        Op::Mul => Ok(left * right),
        Op::Div => {
            if right == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(left / right)
            }
        }
    }
}
