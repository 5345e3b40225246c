use ca_rules::{ParseLife, ParseRuleError};
use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid rule string: {0}")]
    Parse(#[from] ParseRuleError),
    #[error("rules with birth on 0 neighbors are not supported")]
    BirthOnZero,
}

/// A totalistic birth/survival rule.
///
/// Alongside the two neighbor-count sets, a rule carries a transition table
/// from every 4x4 block (a 16-bit integer, row-major, most significant bit at
/// the north-west corner) to its central 2x2 block one generation later (a
/// 4-bit leaf: `nw = 8`, `ne = 4`, `sw = 2`, `se = 1`).
#[derive(Clone)]
pub struct Rule {
    birth: [bool; 9],
    survive: [bool; 9],
    pub(crate) table: Box<[u8]>,
}

impl Debug for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("Rule").field(&self.to_string()).finish()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.birth == other.birth && self.survive == other.survive
    }
}

impl Eq for Rule {}

impl Default for Rule {
    fn default() -> Self {
        Rule::conway()
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("B")?;
        for n in (0..9).filter(|&n| self.birth[n]) {
            write!(f, "{}", n)?;
        }
        f.write_str("/S")?;
        for n in (0..9).filter(|&n| self.survive[n]) {
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

/// Intermediate form produced by the rule string parser.
struct BirthSurvival {
    birth: Vec<u8>,
    survive: Vec<u8>,
}

impl ParseLife for BirthSurvival {
    fn from_bs(b: Vec<u8>, s: Vec<u8>) -> Self {
        BirthSurvival {
            birth: b,
            survive: s,
        }
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let BirthSurvival { birth, survive } = BirthSurvival::parse_rule(s)?;
        Rule::from_bs(&birth, &survive)
    }
}

impl Rule {
    /// Conway's Game of Life, B3/S23.
    pub fn conway() -> Self {
        let mut birth = [false; 9];
        let mut survive = [false; 9];
        birth[3] = true;
        survive[2] = true;
        survive[3] = true;
        Rule::build(birth, survive)
    }

    pub fn new(birth: [bool; 9], survive: [bool; 9]) -> Result<Self, RuleError> {
        if birth[0] {
            return Err(RuleError::BirthOnZero);
        }
        Ok(Rule::build(birth, survive))
    }

    /// Builds a rule from lists of neighbor counts. Counts above 8 are ignored.
    pub fn from_bs(b: &[u8], s: &[u8]) -> Result<Self, RuleError> {
        let mut birth = [false; 9];
        let mut survive = [false; 9];
        b.iter()
            .filter(|&&n| n < 9)
            .for_each(|&n| birth[n as usize] = true);
        s.iter()
            .filter(|&&n| n < 9)
            .for_each(|&n| survive[n as usize] = true);
        Rule::new(birth, survive)
    }

    pub fn birth(&self, neighbors: usize) -> bool {
        self.birth.get(neighbors).copied().unwrap_or(false)
    }

    pub fn survive(&self, neighbors: usize) -> bool {
        self.survive.get(neighbors).copied().unwrap_or(false)
    }

    /// Whether a cell in the given state with the given number of live
    /// neighbors is alive in the next generation.
    pub fn next_state(&self, alive: bool, neighbors: usize) -> bool {
        if alive {
            self.survive(neighbors)
        } else {
            self.birth(neighbors)
        }
    }

    /// Advances the central 2x2 block of a 4x4 block by one generation.
    pub(crate) fn step_block(&self, block: u16) -> u8 {
        self.table[block as usize]
    }

    fn build(birth: [bool; 9], survive: [bool; 9]) -> Self {
        let mut rule = Rule {
            birth,
            survive,
            table: Box::default(),
        };
        rule.table = (0..=u16::MAX).map(|block| rule.center_of(block)).collect();
        rule
    }

    fn center_of(&self, block: u16) -> u8 {
        let cell = |row: usize, col: usize| block >> (15 - 4 * row - col) & 1 != 0;
        let mut result = 0;
        for row in 1..3 {
            for col in 1..3 {
                let neighbors = (row - 1..=row + 1)
                    .flat_map(|r| (col - 1..=col + 1).map(move |c| (r, c)))
                    .filter(|&(r, c)| (r, c) != (row, col) && cell(r, c))
                    .count();
                if self.next_state(cell(row, col), neighbors) {
                    result |= 1 << (3 - (2 * (row - 1) + (col - 1)));
                }
            }
        }
        result
    }
}
