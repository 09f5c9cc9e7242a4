//! Embedded plural-rule evaluator.
//!
//! A plural definition is a gettext-style expression over one integer
//! variable `n`, e.g. `n == 1 ? 0 : 1`, selecting which translated form
//! applies for a given count. The parser and validator only ever see the
//! narrow [`PluralFormInfo`] interface; the expression grammar stays private
//! to this module.

use thiserror::Error;

/// Highest `n` probed when checking a definition against its declared form
/// count. Covers the mod-100/mod-1000 periods of known plural rules.
const PROBE_LIMIT: u64 = 10_000;

/// A plural definition that cannot be parsed or is inconsistent with the
/// declared form count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid plural form: {reason}")]
pub struct InvalidPluralForm {
    reason: &'static str,
}

impl InvalidPluralForm {
    const fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Expression tree of a plural rule. Comparisons and logical operators
/// produce booleans, everything else numbers; the parser enforces the
/// distinction so evaluation cannot mix them up.
#[derive(Debug)]
enum Expr {
    Number(u64),
    N,
    Mod(Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
}

impl Expr {
    /// Evaluates the expression for `n`; booleans are 0/1. `None` on
    /// modulo by zero.
    fn eval(&self, n: u64) -> Option<u64> {
        Some(match self {
            Self::Number(value) => *value,
            Self::N => n,
            Self::Mod(lhs, rhs) => lhs.eval(n)?.checked_rem(rhs.eval(n)?)?,
            Self::Cmp(op, lhs, rhs) => {
                let lhs = lhs.eval(n)?;
                let rhs = rhs.eval(n)?;
                u64::from(match op {
                    CmpOp::Eq => lhs == rhs,
                    CmpOp::Ne => lhs != rhs,
                    CmpOp::Le => lhs <= rhs,
                    CmpOp::Ge => lhs >= rhs,
                    CmpOp::Lt => lhs < rhs,
                    CmpOp::Gt => lhs > rhs,
                })
            }
            Self::And(lhs, rhs) => u64::from(lhs.eval(n)? != 0 && rhs.eval(n)? != 0),
            Self::Or(lhs, rhs) => u64::from(lhs.eval(n)? != 0 || rhs.eval(n)? != 0),
            Self::Conditional(cond, then_expr, else_expr) => {
                if cond.eval(n)? != 0 {
                    then_expr.eval(n)?
                } else {
                    else_expr.eval(n)?
                }
            }
        })
    }
}

/// Result type of a sub-expression during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ty {
    Number,
    Boolean,
}

/// Recursive-descent parser over the definition bytes.
///
/// Grammar, loosest binding first:
/// ```text
/// expression : or-expr ('?' expression ':' expression)?
/// or-expr    : and-expr ('||' or-expr)?
/// and-expr   : cmp-expr ('&&' and-expr)?
/// cmp-expr   : mod-expr (('=='|'!='|'<='|'>='|'<'|'>') cmp-expr)?
/// mod-expr   : term ('%' term)?
/// term       : 'n' | integer | '(' expression ')'
/// ```
#[derive(Debug)]
struct ExprParser<'a> {
    rest: &'a [u8],
}

impl ExprParser<'_> {
    /// Parses a whole definition. A boolean top-level expression like
    /// `n != 1` is accepted and selects form 1/0, gettext style.
    fn parse(definition: &str) -> Result<Expr, InvalidPluralForm> {
        let mut parser = ExprParser { rest: definition.as_bytes() };
        let (expr, ty) = parser.expression()?;
        parser.skip_whitespace();
        if !parser.rest.is_empty() {
            return Err(InvalidPluralForm::new("trailing characters after expression"));
        }
        Ok(match ty {
            Ty::Boolean => Expr::Conditional(
                Box::new(expr),
                Box::new(Expr::Number(1)),
                Box::new(Expr::Number(0)),
            ),
            Ty::Number => expr,
        })
    }

    fn expression(&mut self) -> Result<(Expr, Ty), InvalidPluralForm> {
        let (cond, ty) = self.or_expr()?;
        self.skip_whitespace();
        if ty != Ty::Boolean || !self.eat(b"?") {
            return Ok((cond, ty));
        }
        let (then_expr, then_ty) = self.expression()?;
        self.skip_whitespace();
        if !self.eat(b":") {
            return Err(InvalidPluralForm::new("expected ':' in conditional"));
        }
        let (else_expr, else_ty) = self.expression()?;
        if then_ty != else_ty {
            return Err(InvalidPluralForm::new("mismatched branch types in conditional"));
        }
        Ok((
            Expr::Conditional(Box::new(cond), Box::new(then_expr), Box::new(else_expr)),
            then_ty,
        ))
    }

    fn or_expr(&mut self) -> Result<(Expr, Ty), InvalidPluralForm> {
        let (lhs, lhs_ty) = self.and_expr()?;
        self.skip_whitespace();
        if !self.eat(b"||") {
            return Ok((lhs, lhs_ty));
        }
        let (rhs, rhs_ty) = self.or_expr()?;
        if lhs_ty != Ty::Boolean || rhs_ty != Ty::Boolean {
            return Err(InvalidPluralForm::new("'||' needs boolean operands"));
        }
        Ok((Expr::Or(Box::new(lhs), Box::new(rhs)), Ty::Boolean))
    }

    fn and_expr(&mut self) -> Result<(Expr, Ty), InvalidPluralForm> {
        let (lhs, lhs_ty) = self.cmp_expr()?;
        self.skip_whitespace();
        if !self.eat(b"&&") {
            return Ok((lhs, lhs_ty));
        }
        let (rhs, rhs_ty) = self.and_expr()?;
        if lhs_ty != Ty::Boolean || rhs_ty != Ty::Boolean {
            return Err(InvalidPluralForm::new("'&&' needs boolean operands"));
        }
        Ok((Expr::And(Box::new(lhs), Box::new(rhs)), Ty::Boolean))
    }

    fn cmp_expr(&mut self) -> Result<(Expr, Ty), InvalidPluralForm> {
        // Two-byte operators first so `<=` never scans as `<` `=`.
        const OPS: &[(&[u8], CmpOp)] = &[
            (b"==", CmpOp::Eq),
            (b"!=", CmpOp::Ne),
            (b"<=", CmpOp::Le),
            (b">=", CmpOp::Ge),
            (b"<", CmpOp::Lt),
            (b">", CmpOp::Gt),
        ];

        let (lhs, lhs_ty) = self.mod_expr()?;
        self.skip_whitespace();
        for (token, op) in OPS {
            if self.eat(token) {
                let (rhs, rhs_ty) = self.cmp_expr()?;
                if lhs_ty != Ty::Number || rhs_ty != Ty::Number {
                    return Err(InvalidPluralForm::new("comparison needs numeric operands"));
                }
                return Ok((Expr::Cmp(*op, Box::new(lhs), Box::new(rhs)), Ty::Boolean));
            }
        }
        Ok((lhs, lhs_ty))
    }

    fn mod_expr(&mut self) -> Result<(Expr, Ty), InvalidPluralForm> {
        let (lhs, lhs_ty) = self.term()?;
        self.skip_whitespace();
        if !self.eat(b"%") {
            return Ok((lhs, lhs_ty));
        }
        let (rhs, rhs_ty) = self.term()?;
        if lhs_ty != Ty::Number || rhs_ty != Ty::Number {
            return Err(InvalidPluralForm::new("'%' needs numeric operands"));
        }
        Ok((Expr::Mod(Box::new(lhs), Box::new(rhs)), Ty::Number))
    }

    fn term(&mut self) -> Result<(Expr, Ty), InvalidPluralForm> {
        self.skip_whitespace();
        match self.rest.first() {
            Some(b'n') => {
                self.rest = self.rest.get(1..).unwrap_or_default();
                Ok((Expr::N, Ty::Number))
            }
            Some(b'(') => {
                self.rest = self.rest.get(1..).unwrap_or_default();
                let inner = self.expression()?;
                self.skip_whitespace();
                if !self.eat(b")") {
                    return Err(InvalidPluralForm::new("expected ')'"));
                }
                Ok(inner)
            }
            Some(byte) if byte.is_ascii_digit() => self.number(),
            _ => Err(InvalidPluralForm::new("expected 'n', a number, or '('")),
        }
    }

    fn number(&mut self) -> Result<(Expr, Ty), InvalidPluralForm> {
        let digits = self.rest.iter().take_while(|byte| byte.is_ascii_digit()).count();
        let (literal, rest) = self.rest.split_at(digits);
        let value = std::str::from_utf8(literal)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or(InvalidPluralForm::new("number out of range"))?;
        self.rest = rest;
        Ok((Expr::Number(value), Ty::Number))
    }

    /// Consumes `token` if the input continues with it. Callers skip
    /// whitespace first.
    fn eat(&mut self, token: &[u8]) -> bool {
        if let Some(rest) = self.rest.strip_prefix(token) {
            self.rest = rest;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_ascii_start();
    }
}

/// Probed statistics of one form slot.
#[derive(Debug, Clone, Copy, Default)]
struct FormStat {
    occurrences: usize,
    first_number: u64,
}

/// Per-slot answers about a plural definition: how many forms there are,
/// whether a slot is selected by exactly one concrete number, and a
/// representative number selecting it.
#[derive(Debug)]
pub struct PluralFormInfo {
    forms: Vec<FormStat>,
}

impl PluralFormInfo {
    /// Parses `definition` and checks it against `declared_count` by probing
    /// `n = 0..=PROBE_LIMIT`: every probe must select a slot below the
    /// declared count and every slot must be selected at least once.
    pub fn new(definition: &str, declared_count: usize) -> Result<Self, InvalidPluralForm> {
        if declared_count == 0 {
            return Err(InvalidPluralForm::new("plural form count must be at least 1"));
        }
        let rule = ExprParser::parse(definition)?;

        let mut forms = vec![FormStat::default(); declared_count];
        for n in 0..=PROBE_LIMIT {
            let index = rule.eval(n).ok_or(InvalidPluralForm::new("modulo by zero"))?;
            let slot = usize::try_from(index)
                .ok()
                .and_then(|index| forms.get_mut(index))
                .ok_or(InvalidPluralForm::new(
                    "expression selects a form beyond the declared count",
                ))?;
            if slot.occurrences == 0 {
                slot.first_number = n;
            }
            slot.occurrences += 1;
        }
        if forms.iter().any(|form| form.occurrences == 0) {
            return Err(InvalidPluralForm::new("a declared form is never selected"));
        }
        Ok(Self { forms })
    }

    /// Number of plural forms the definition distinguishes.
    #[must_use]
    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    /// True iff exactly one concrete number selects this slot, e.g. slot 0
    /// of `n == 1 ? 0 : 1`.
    #[must_use]
    pub fn is_single_number_form(&self, slot: usize) -> bool {
        self.forms.get(slot).is_some_and(|form| form.occurrences == 1)
    }

    /// The smallest probed number selecting this slot; `Some` for every slot
    /// below [`Self::form_count`] by construction.
    #[must_use]
    pub fn first_number(&self, slot: usize) -> Option<u64> {
        self.forms.get(slot).map(|form| form.first_number)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::rstest;

    use super::*;

    const ENGLISH: &str = "n == 1 ? 0 : 1";
    const RUSSIAN: &str = "n % 10 == 1 && n % 100 != 11 ? 0 : \
                           n % 10 >= 2 && n % 10 <= 4 && (n % 100 < 10 || n % 100 >= 20) ? 1 : 2";

    #[test]
    fn test_english_rule() {
        let info = PluralFormInfo::new(ENGLISH, 2).unwrap();
        assert_eq!(info.form_count(), 2);
        assert!(info.is_single_number_form(0));
        assert_eq!(info.first_number(0), Some(1));
        assert!(!info.is_single_number_form(1));
        assert_eq!(info.first_number(1), Some(0));
    }

    #[test]
    fn test_russian_rule_selects_expected_slots() {
        let rule = ExprParser::parse(RUSSIAN).unwrap();
        assert_eq!(rule.eval(1), Some(0));
        assert_eq!(rule.eval(2), Some(1));
        assert_eq!(rule.eval(5), Some(2));
        assert_eq!(rule.eval(11), Some(2));
        assert_eq!(rule.eval(21), Some(0));
        assert_eq!(rule.eval(22), Some(1));
        assert_eq!(rule.eval(100), Some(2));

        let info = PluralFormInfo::new(RUSSIAN, 3).unwrap();
        assert_eq!(info.form_count(), 3);
        assert!(!info.is_single_number_form(0)); // 1, 21, 31, ...
        assert!(!info.is_single_number_form(2));
    }

    #[test]
    fn test_boolean_definition_maps_to_one_zero() {
        let info = PluralFormInfo::new("n != 1", 2).unwrap();
        assert!(info.is_single_number_form(0));
        assert_eq!(info.first_number(0), Some(1));
        assert_eq!(info.first_number(1), Some(0));
    }

    #[test]
    fn test_constant_definition_with_one_form() {
        let info = PluralFormInfo::new("0", 1).unwrap();
        assert_eq!(info.form_count(), 1);
        assert!(!info.is_single_number_form(0));
    }

    #[rstest]
    #[case::garbage("what is this")]
    #[case::empty("")]
    #[case::trailing("n == 1 ? 0 : 1 nonsense")]
    #[case::unbalanced_paren("(n == 1 ? 0 : 1")]
    #[case::missing_colon("n == 1 ? 0")]
    #[case::boolean_modulo("(n == 1) % 2")]
    #[case::numeric_or("n || 1")]
    fn test_rejects_malformed_definitions(#[case] definition: &str) {
        assert!(PluralFormInfo::new(definition, 2).is_err(), "{definition:?} was accepted");
    }

    #[test]
    fn test_rejects_count_inconsistencies() {
        // Slot 2 can never be selected by a two-way rule.
        assert!(PluralFormInfo::new(ENGLISH, 3).is_err());
        // Index 1 is beyond a declared count of 1.
        assert!(PluralFormInfo::new(ENGLISH, 1).is_err());
        assert!(PluralFormInfo::new(ENGLISH, 0).is_err());
    }

    #[test]
    fn test_rejects_modulo_by_zero() {
        assert!(PluralFormInfo::new("n % 0 == 1 ? 0 : 1", 2).is_err());
    }
}
