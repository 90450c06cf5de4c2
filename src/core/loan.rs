use crate::core::error::{Result, SimulationError};
use crate::core::precision::checked_sum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a loan within one loan set.
///
/// # Examples
///
/// ```
/// use repayment_engine::core::loan::LoanId;
///
/// let card = LoanId::new("CARD");
/// let car = LoanId::new("CAR");
/// assert_ne!(card, car);
/// assert!(car < card);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LoanId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LoanId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single interest-bearing loan.
///
/// `balance` is principal plus accrued interest and never drops below zero.
/// `rate` is the fixed per-period rate as a fraction, so `0.025` accrues
/// 2.5% of the balance each month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    balance: Decimal,
    rate: Decimal,
}

impl Loan {
    /// Create a loan, rejecting negative balances and rates outside `[0, 1)`.
    pub fn new(id: impl Into<LoanId>, balance: Decimal, rate: Decimal) -> Result<Self> {
        let loan = Self {
            id: id.into(),
            balance,
            rate,
        };
        loan.validate()?;
        Ok(loan)
    }

    pub fn id(&self) -> &LoanId {
        &self.id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// A loan is active while it still carries a balance.
    pub fn is_active(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    pub(crate) fn set_balance(&mut self, balance: Decimal) {
        debug_assert!(balance >= Decimal::ZERO, "loan balance went negative");
        self.balance = balance;
    }

    pub fn validate(&self) -> Result<()> {
        if self.balance < Decimal::ZERO {
            return Err(SimulationError::invalid(format!(
                "loan {} has negative balance {}",
                self.id, self.balance
            )));
        }
        if self.rate < Decimal::ZERO || self.rate >= Decimal::ONE {
            return Err(SimulationError::invalid(format!(
                "loan {} rate {} must be a fraction in [0, 1)",
                self.id, self.rate
            )));
        }
        Ok(())
    }
}

/// A fixed collection of loans keyed by id.
///
/// Iteration is always in id order, which keeps snapshot layouts stable.
/// Cloning produces an independent deep copy, so every simulation run gets
/// its own state.
///
/// Serialized as `{"loans": [{"id": .., "balance": .., "rate": ..}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSet {
    #[serde(with = "loans_serde")]
    loans: BTreeMap<LoanId, Loan>,
}

mod loans_serde {
    use super::*;
    use serde::de::{self, SeqAccess, Visitor};
    use serde::ser::SerializeSeq;

    pub fn serialize<S: serde::Serializer>(
        loans: &BTreeMap<LoanId, Loan>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(loans.len()))?;
        for loan in loans.values() {
            seq.serialize_element(loan)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<BTreeMap<LoanId, Loan>, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = BTreeMap<LoanId, Loan>;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of loans with unique ids")
            }
            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut map = BTreeMap::new();
                while let Some(loan) = access.next_element::<Loan>()? {
                    loan.validate().map_err(de::Error::custom)?;
                    let id = loan.id().clone();
                    if map.insert(id.clone(), loan).is_some() {
                        return Err(de::Error::custom(format!("duplicate loan id: {id}")));
                    }
                }
                Ok(map)
            }
        }
        deserializer.deserialize_seq(V)
    }
}

impl LoanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from loans, rejecting duplicate ids.
    pub fn from_loans(loans: impl IntoIterator<Item = Loan>) -> Result<Self> {
        let mut set = Self::new();
        for loan in loans {
            set.insert(loan)?;
        }
        Ok(set)
    }

    /// Add a loan. Ids must be unique within the set.
    pub fn insert(&mut self, loan: Loan) -> Result<()> {
        if self.loans.contains_key(loan.id()) {
            return Err(SimulationError::invalid(format!(
                "duplicate loan id: {}",
                loan.id()
            )));
        }
        self.loans.insert(loan.id().clone(), loan);
        Ok(())
    }

    pub fn get(&self, id: &LoanId) -> Option<&Loan> {
        self.loans.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &LoanId) -> Option<&mut Loan> {
        self.loans.get_mut(id)
    }

    pub fn contains(&self, id: &LoanId) -> bool {
        self.loans.contains_key(id)
    }

    /// Loans in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Loan> {
        self.loans.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &LoanId> {
        self.loans.keys()
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// Number of loans that still carry a balance.
    pub fn active_count(&self) -> usize {
        self.loans.values().filter(|l| l.is_active()).count()
    }

    /// Sum of all outstanding balances, `None` if it exceeds the decimal range.
    pub fn total_balance(&self) -> Option<Decimal> {
        checked_sum(self.loans.values().map(|l| l.balance()))
    }

    /// Re-check every loan, e.g. after deserialization.
    pub fn validate(&self) -> Result<()> {
        self.loans.values().try_for_each(Loan::validate)
    }
}

impl<'a> IntoIterator for &'a LoanSet {
    type Item = &'a Loan;
    type IntoIter = std::collections::btree_map::Values<'a, LoanId, Loan>;

    fn into_iter(self) -> Self::IntoIter {
        self.loans.values()
    }
}
