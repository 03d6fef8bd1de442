// Copyright 2025 Cowboy AI, LLC.

//! Calculated-field formulas
//!
//! A formula is an arithmetic expression over sibling field names, e.g.
//! `"cantidad * precio + recargo"`. Formulas are validated against their
//! template up front (charset, balanced parentheses, known references, no
//! self-reference) and evaluated with a recursive-descent parser over f64.
//! Field tokens resolve through the submitted data, coercing non-numeric
//! values to 0. No dynamic code evaluation is involved anywhere.

use serde_json::{Map, Value};

use super::fields::{PlantillaFormulario, TipoCampo};
use crate::errors::{DomainError, DomainResult};

/// Validate a calculated field's formula against its owning template.
///
/// Rules:
/// - only digits, letters, underscores, `+ - * / ( ) .` and whitespace;
/// - parentheses are balanced;
/// - every identifier names an existing field;
/// - the field may not reference itself;
/// - referenced fields may not themselves be calculated (no chained
///   formulas).
pub fn validar_formula(
    nombre_campo: &str,
    formula: &str,
    plantilla: &PlantillaFormulario,
) -> DomainResult<()> {
    let etiqueta = format!("campos.{nombre_campo}.formula");

    if formula.trim().is_empty() {
        return Err(DomainError::validation(etiqueta.clone(), "formula is empty"));
    }

    if let Some(c) = formula
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || c.is_whitespace() || "_+-*/().".contains(*c)))
    {
        return Err(DomainError::validation(
            etiqueta.clone(),
            format!("illegal character `{c}`"),
        ));
    }

    let mut profundidad: i32 = 0;
    for c in formula.chars() {
        match c {
            '(' => profundidad += 1,
            ')' => {
                profundidad -= 1;
                if profundidad < 0 {
                    return Err(DomainError::validation(etiqueta.clone(), "unbalanced parentheses"));
                }
            }
            _ => {}
        }
    }
    if profundidad != 0 {
        return Err(DomainError::validation(etiqueta.clone(), "unbalanced parentheses"));
    }

    for token in tokenizar(formula, &etiqueta)? {
        if let Token::Identificador(nombre) = token {
            if nombre == nombre_campo {
                return Err(DomainError::validation(
                    etiqueta.clone(),
                    "a calculated field cannot reference itself",
                ));
            }
            match plantilla.campo(&nombre) {
                None => {
                    return Err(DomainError::validation(
                        etiqueta.clone(),
                        format!("unknown field `{nombre}`"),
                    ));
                }
                Some(campo) => {
                    if matches!(campo.tipo, TipoCampo::Calculado { .. }) {
                        return Err(DomainError::validation(
                            etiqueta.clone(),
                            format!("`{nombre}` is itself calculated; chained formulas are not allowed"),
                        ));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Evaluate a formula against submitted data.
///
/// Identifier tokens resolve through `datos`: numbers evaluate as-is,
/// numeric strings parse, booleans count as 0/1, anything else (including a
/// missing value) coerces to 0.
pub fn evaluar_formula(formula: &str, datos: &Map<String, Value>) -> DomainResult<f64> {
    let tokens = tokenizar(formula, "formula")?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        datos,
    };
    let resultado = parser.expresion()?;
    if parser.pos != tokens.len() {
        return Err(DomainError::validation(
            "formula",
            "unexpected trailing tokens",
        ));
    }
    if !resultado.is_finite() {
        return Err(DomainError::validation(
            "formula",
            "evaluation is not finite (division by zero?)",
        ));
    }
    Ok(resultado)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Numero(f64),
    Identificador(String),
    Mas,
    Menos,
    Por,
    Entre,
    ParenIzq,
    ParenDer,
}

fn tokenizar(formula: &str, etiqueta: &str) -> DomainResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = formula.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Mas);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Menos);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Por);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Entre);
            }
            '(' => {
                chars.next();
                tokens.push(Token::ParenIzq);
            }
            ')' => {
                chars.next();
                tokens.push(Token::ParenDer);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let valor: f64 = literal.parse().map_err(|_| {
                    DomainError::validation(etiqueta, format!("malformed number `{literal}`"))
                })?;
                tokens.push(Token::Numero(valor));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut nombre = String::new();
                while let Some(&c) = chars.peek() {
                    // Word boundary: an identifier runs until the first
                    // non-identifier character.
                    if c.is_ascii_alphanumeric() || c == '_' {
                        nombre.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Identificador(nombre));
            }
            otro => {
                return Err(DomainError::validation(
                    etiqueta,
                    format!("illegal character `{otro}`"),
                ));
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser:
///
/// ```text
/// expresion := termino (('+' | '-') termino)*
/// termino   := factor (('*' | '/') factor)*
/// factor    := '-' factor | numero | identificador | '(' expresion ')'
/// ```
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    datos: &'a Map<String, Value>,
}

impl Parser<'_> {
    fn expresion(&mut self) -> DomainResult<f64> {
        let mut acumulado = self.termino()?;
        loop {
            match self.actual() {
                Some(Token::Mas) => {
                    self.pos += 1;
                    acumulado += self.termino()?;
                }
                Some(Token::Menos) => {
                    self.pos += 1;
                    acumulado -= self.termino()?;
                }
                _ => return Ok(acumulado),
            }
        }
    }

    fn termino(&mut self) -> DomainResult<f64> {
        let mut acumulado = self.factor()?;
        loop {
            match self.actual() {
                Some(Token::Por) => {
                    self.pos += 1;
                    acumulado *= self.factor()?;
                }
                Some(Token::Entre) => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(DomainError::validation("formula", "division by zero"));
                    }
                    acumulado /= divisor;
                }
                _ => return Ok(acumulado),
            }
        }
    }

    fn factor(&mut self) -> DomainResult<f64> {
        match self.actual().cloned() {
            Some(Token::Menos) => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some(Token::Numero(valor)) => {
                self.pos += 1;
                Ok(valor)
            }
            Some(Token::Identificador(nombre)) => {
                self.pos += 1;
                Ok(valor_numerico(self.datos.get(&nombre)))
            }
            Some(Token::ParenIzq) => {
                self.pos += 1;
                let valor = self.expresion()?;
                match self.actual() {
                    Some(Token::ParenDer) => {
                        self.pos += 1;
                        Ok(valor)
                    }
                    _ => Err(DomainError::validation("formula", "expected `)`")),
                }
            }
            _ => Err(DomainError::validation(
                "formula",
                "expected a number, field name or `(`",
            )),
        }
    }

    fn actual(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }
}

fn valor_numerico(valor: Option<&Value>) -> f64 {
    match valor {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}
