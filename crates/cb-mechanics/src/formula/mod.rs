//! Dice formula evaluation.
//!
//! Formulas are lexed with logos and parsed with chumsky into an [`Expr`]
//! tree, then evaluated left to right against a [`RollData`] context with
//! checked integer arithmetic. Each evaluation draws fresh faces from the
//! supplied [`RandomSource`].
//!
//! ```text
//! 1d20 + @abilities.strength.value
//! (1d8 + 1) * 2
//! d4 + 1
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{BinOp, Expr};

use std::fmt;
use std::str::FromStr;

use cb_core::RollData;

use crate::dice::{DicePool, Die, DieResult, RandomSource, Roll};
use crate::error::{MechError, MechResult};

/// A parsed, reusable dice formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse a formula. Syntax errors, zero-sided dice and oversized dice
    /// terms are rejected here, before anything is rolled.
    pub fn parse(source: &str) -> MechResult<Self> {
        let (tokens, lex_errors) = lexer::lex(source);
        if let Some(error) = lex_errors.first() {
            return Err(MechError::formula(source, error.message.clone()));
        }
        if tokens.is_empty() {
            return Err(MechError::formula(source, "empty formula"));
        }
        let expr = parser::parse(&tokens).map_err(|errors| {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            MechError::formula(source, message)
        })?;
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    /// The formula as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed expression tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// This formula times two, keeping its own precedence:
    /// `1d6+1` becomes `(1d6+1) * 2`.
    pub fn doubled(&self) -> Self {
        Self {
            source: format!("({}) * 2", self.source),
            expr: Expr::binary(BinOp::Mul, self.expr.clone(), Expr::Number(2)),
        }
    }

    /// Evaluate against `data`, drawing dice from `rng`.
    ///
    /// Every variable is resolved before the first die is drawn, so an
    /// unknown variable never consumes randomness.
    pub fn evaluate(&self, data: &RollData, rng: &mut dyn RandomSource) -> MechResult<Roll> {
        if let Some(missing) = self
            .expr
            .variables()
            .into_iter()
            .find(|path| data.get(path).is_none())
        {
            return Err(MechError::UnresolvedVariable {
                formula: self.source.clone(),
                variable: missing.to_string(),
            });
        }

        let mut dice = Vec::new();
        let total = self.eval(&self.expr, data, rng, &mut dice)?;
        tracing::debug!(formula = %self.source, total, dice = dice.len(), "evaluated formula");
        Ok(Roll {
            formula: self.source.clone(),
            total,
            dice,
        })
    }

    fn eval(
        &self,
        expr: &Expr,
        data: &RollData,
        rng: &mut dyn RandomSource,
        dice: &mut Vec<DieResult>,
    ) -> MechResult<i64> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Variable(path) => data.get(path).ok_or_else(|| MechError::UnresolvedVariable {
                formula: self.source.clone(),
                variable: path.clone(),
            }),
            Expr::Dice { count, sides } => {
                let die = Die::from_sides(*sides)
                    .ok_or_else(|| MechError::formula(&self.source, "dice need at least one side"))?;
                let results = DicePool::new().add(die, *count).roll(rng);
                let sum = results.iter().map(|d| i64::from(d.value)).sum();
                dice.extend(results);
                Ok(sum)
            }
            Expr::Neg(inner) => self
                .eval(inner, data, rng, dice)?
                .checked_neg()
                .ok_or_else(|| self.overflow()),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs, data, rng, dice)?;
                let rhs = self.eval(rhs, data, rng, dice)?;
                match op {
                    BinOp::Add => lhs.checked_add(rhs).ok_or_else(|| self.overflow()),
                    BinOp::Sub => lhs.checked_sub(rhs).ok_or_else(|| self.overflow()),
                    BinOp::Mul => lhs.checked_mul(rhs).ok_or_else(|| self.overflow()),
                    BinOp::Div if rhs == 0 => {
                        Err(MechError::formula(&self.source, "division by zero"))
                    }
                    BinOp::Div => lhs.checked_div(rhs).ok_or_else(|| self.overflow()),
                }
            }
        }
    }

    fn overflow(&self) -> MechError {
        MechError::formula(&self.source, "arithmetic overflow")
    }
}

impl FromStr for Formula {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Parse and evaluate `formula` in one step.
pub fn evaluate(formula: &str, data: &RollData, rng: &mut dyn RandomSource) -> MechResult<Roll> {
    Formula::parse(formula)?.evaluate(data, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn strength(value: i64) -> RollData {
        RollData::new().with("abilities.strength.value", value)
    }

    #[test]
    fn attack_roll_uses_natural_face() {
        let mut dice = ScriptedDice::new([15]);
        let roll = evaluate("1d20 + @abilities.strength.value", &strength(2), &mut dice).unwrap();
        assert_eq!(roll.total, 17);
        assert_eq!(roll.natural(), Some(15));
        assert_eq!(roll.dice.len(), 1);
        assert_eq!(roll.dice[0].die, Die::D20);
    }

    #[test]
    fn multiple_dice_sum() {
        let mut dice = ScriptedDice::new([2, 5, 6]);
        let roll = evaluate("3d6", &RollData::new(), &mut dice).unwrap();
        assert_eq!(roll.total, 13);
        assert_eq!(roll.natural(), Some(2));
    }

    #[test]
    fn precedence_and_division() {
        let mut dice = ScriptedDice::default();
        let data = RollData::new();
        assert_eq!(evaluate("2 + 3 * 4", &data, &mut dice).unwrap().total, 14);
        assert_eq!(evaluate("(2 + 3) * 4", &data, &mut dice).unwrap().total, 20);
        assert_eq!(evaluate("7 / 2", &data, &mut dice).unwrap().total, 3);
        assert_eq!(evaluate("-7 / 2", &data, &mut dice).unwrap().total, -3);
        assert_eq!(evaluate("--3", &data, &mut dice).unwrap().total, 3);
    }

    #[test]
    fn flat_formula_has_no_natural() {
        let roll = evaluate("1", &RollData::new(), &mut ScriptedDice::default()).unwrap();
        assert_eq!(roll.total, 1);
        assert_eq!(roll.natural(), None);
    }

    #[test]
    fn doubled_keeps_precedence() {
        let formula = Formula::parse("1d6+1").unwrap().doubled();
        assert_eq!(formula.source(), "(1d6+1) * 2");
        let roll = formula
            .evaluate(&RollData::new(), &mut ScriptedDice::new([4]))
            .unwrap();
        assert_eq!(roll.total, 10);
    }

    #[test]
    fn unresolved_variable_draws_nothing() {
        let mut dice = ScriptedDice::new([10]);
        let err = evaluate("1d20 + @abilities.luck.value", &RollData::new(), &mut dice).unwrap_err();
        assert!(matches!(
            err,
            MechError::UnresolvedVariable { ref variable, .. } if variable == "abilities.luck.value"
        ));
        assert_eq!(dice.drawn(), 0);
    }

    #[test]
    fn syntax_errors_are_formula_errors() {
        for bad in ["", "   ", "1d20 +", "1d0", "abc", "1001d6", "(1"] {
            assert!(
                matches!(Formula::parse(bad), Err(MechError::Formula { .. })),
                "expected formula error for {bad:?}"
            );
        }
    }

    #[test]
    fn division_by_zero_and_overflow() {
        let mut dice = ScriptedDice::default();
        let data = RollData::new();
        assert!(matches!(
            evaluate("1 / 0", &data, &mut dice),
            Err(MechError::Formula { ref message, .. }) if message == "division by zero"
        ));
        assert!(matches!(
            evaluate("9223372036854775807 + 1", &data, &mut dice),
            Err(MechError::Formula { ref message, .. }) if message == "arithmetic overflow"
        ));
    }

    #[test]
    fn source_is_trimmed() {
        assert_eq!(Formula::parse("  d4 ").unwrap().to_string(), "d4");
    }

    proptest! {
        #[test]
        fn die_term_stays_in_range(count in 1u32..20, sides in 1u32..100, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let roll = evaluate(&format!("{count}d{sides}"), &RollData::new(), &mut rng).unwrap();
            prop_assert_eq!(roll.dice.len(), count as usize);
            prop_assert!(roll.total >= i64::from(count));
            prop_assert!(roll.total <= i64::from(count) * i64::from(sides));
        }

        #[test]
        fn doubled_is_exactly_twice(face in 1u32..=8, bonus in -5i64..5) {
            let formula = Formula::parse(&format!("1d8 + {bonus}")).unwrap();
            let plain = formula.evaluate(&RollData::new(), &mut ScriptedDice::new([face])).unwrap();
            let doubled = formula.doubled().evaluate(&RollData::new(), &mut ScriptedDice::new([face])).unwrap();
            prop_assert_eq!(doubled.total, plain.total * 2);
        }
    }
}
