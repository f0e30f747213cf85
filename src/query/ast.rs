use serde::{Serialize, Deserialize};

/// Filter predicate tree. Parsed once per query, evaluated over bitmaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    Condition(Condition),
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    Equal,
    NotEqual,
}

impl FilterExpr {
    pub fn condition(field: &str, operator: FilterOperator, value: &str) -> Self {
        FilterExpr::Condition(Condition {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        })
    }

    /// Conjunction that collapses to its only member.
    pub fn and(mut exprs: Vec<FilterExpr>) -> Self {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            FilterExpr::And(exprs)
        }
    }

    pub fn or(mut exprs: Vec<FilterExpr>) -> Self {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            FilterExpr::Or(exprs)
        }
    }

    /// Every field referenced by a leaf, in tree order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FilterExpr::Condition(c) => out.push(c.field.as_str()),
            FilterExpr::And(exprs) | FilterExpr::Or(exprs) => {
                exprs.iter().for_each(|e| e.collect_fields(out))
            }
            FilterExpr::Not(expr) => expr.collect_fields(out),
        }
    }
}
