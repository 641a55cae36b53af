//! 렌더링된 BSON 필터, 업데이트, 프로젝션, 정렬을 메모리의 문서에 적용합니다.
//!
//! 지원 범위
//! - 필터: `$and`, `$or`, `$eq`, `$ne`, `$in`, `$nin`, `$regex`(+`$options`),
//!   `$exists`, `$gt`, `$gte`, `$lt`, `$lte`, 점 경로, 배열 원소 매칭
//! - 업데이트: `$set`, `$unset`, `$inc`, `$addToSet`, `$pull`, `$push`

use std::cmp::Ordering;

use mongodb::bson::{Bson, Document};
use fancy_regex::Regex;

use crate::errors::{DataError, DataResult};

/// 문서가 필터와 일치하는지 평가합니다.
pub fn matches(doc: &Document, filter: &Document) -> DataResult<bool> {
    for (key, condition) in filter {
        let ok = match key.as_str() {
            "$and" => {
                let mut all = true;
                for sub in sub_filters(key, condition)? {
                    if !matches(doc, sub)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for sub in sub_filters(key, condition)? {
                    if matches(doc, sub)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            op if op.starts_with('$') => {
                return Err(DataError::MalformedCriteriaError(format!(
                    "unsupported top-level operator {}",
                    op
                )));
            }
            path => matches_field(doc, path, condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_filters<'a>(op: &str, condition: &'a Bson) -> DataResult<Vec<&'a Document>> {
    let items = match condition {
        Bson::Array(items) if !items.is_empty() => items,
        _ => {
            return Err(DataError::MalformedCriteriaError(format!(
                "{} requires a non-empty array",
                op
            )));
        }
    };
    items
        .iter()
        .map(|item| match item {
            Bson::Document(d) => Ok(d),
            other => Err(DataError::MalformedCriteriaError(format!(
                "{} entries must be documents, got {}",
                op, other
            ))),
        })
        .collect()
}

fn is_operator_document(value: &Bson) -> bool {
    matches!(value, Bson::Document(d) if !d.is_empty() && d.keys().all(|k| k.starts_with('$')))
}

fn matches_field(doc: &Document, path: &str, condition: &Bson) -> DataResult<bool> {
    let candidates = resolve_path(doc, path);
    let Bson::Document(ops) = condition else {
        return Ok(equals_any(&candidates, condition));
    };
    if !is_operator_document(condition) {
        return Ok(equals_any(&candidates, condition));
    }

    for (op, operand) in ops {
        let ok = match op.as_str() {
            "$eq" => equals_any(&candidates, operand),
            "$ne" => !equals_any(&candidates, operand),
            "$in" => in_set(&candidates, operand)?,
            "$nin" => !in_set(&candidates, operand)?,
            "$exists" => !candidates.is_empty() == truthy(operand),
            "$gt" => compare_any(&candidates, operand, |o| o == Ordering::Greater),
            "$gte" => compare_any(&candidates, operand, |o| o != Ordering::Less),
            "$lt" => compare_any(&candidates, operand, |o| o == Ordering::Less),
            "$lte" => compare_any(&candidates, operand, |o| o != Ordering::Greater),
            "$regex" => {
                let options = ops.get_str("$options").unwrap_or("");
                regex_any(&candidates, operand, options)?
            }
            "$options" => true,
            other => {
                return Err(DataError::MalformedCriteriaError(format!(
                    "unsupported operator {} on '{}'",
                    other, path
                )));
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

/// 점 경로를 따라 값을 찾습니다. 중간에 배열이 있으면 각 원소 문서로 펼칩니다.
fn resolve_path<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let mut current: Vec<&Bson> = Vec::new();
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return current;
    };
    if let Some(v) = doc.get(first) {
        current.push(v);
    }
    for segment in segments {
        let mut next = Vec::new();
        for value in current {
            match value {
                Bson::Document(d) => next.extend(d.get(segment)),
                Bson::Array(items) => match segment.parse::<usize>() {
                    Ok(index) => next.extend(items.get(index)),
                    Err(_) => {
                        for item in items {
                            if let Bson::Document(d) = item {
                                next.extend(d.get(segment));
                            }
                        }
                    }
                },
                _ => {}
            }
        }
        current = next;
    }
    current
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    if is_number(a) && is_number(b) {
        return compare_bson(a, b) == Ordering::Equal;
    }
    a == b
}

/// 후보 값 또는 후보 배열의 원소 중 하나라도 같으면 일치.
/// `null` 은 필드가 없는 경우와도 일치합니다.
fn equals_any(candidates: &[&Bson], expected: &Bson) -> bool {
    if candidates.is_empty() {
        return matches!(expected, Bson::Null);
    }
    candidates.iter().any(|candidate| match candidate {
        Bson::Array(items) => {
            values_equal(candidate, expected) || items.iter().any(|i| values_equal(i, expected))
        }
        other => values_equal(other, expected),
    })
}

fn in_set(candidates: &[&Bson], operand: &Bson) -> DataResult<bool> {
    let Bson::Array(values) = operand else {
        return Err(DataError::MalformedCriteriaError(format!(
            "$in/$nin requires an array, got {}",
            operand
        )));
    };
    Ok(values.iter().any(|v| equals_any(candidates, v)))
}

fn compare_any(candidates: &[&Bson], operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    candidates.iter().any(|candidate| {
        comparable(candidate, operand) && accept(compare_bson(candidate, operand))
    })
}

fn comparable(a: &Bson, b: &Bson) -> bool {
    (is_number(a) && is_number(b)) || type_rank(a) == type_rank(b)
}

fn regex_any(candidates: &[&Bson], operand: &Bson, options: &str) -> DataResult<bool> {
    let (pattern, options) = match operand {
        Bson::String(p) => (p.as_str(), options.to_string()),
        Bson::RegularExpression(r) => (r.pattern.as_str(), format!("{}{}", r.options, options)),
        other => {
            return Err(DataError::MalformedCriteriaError(format!(
                "$regex requires a string pattern, got {}",
                other
            )));
        }
    };
    let flags: String = options
        .chars()
        .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x'))
        .collect();
    let source = if flags.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", flags, pattern)
    };
    let re = Regex::new(&source)
        .map_err(|e| DataError::MalformedCriteriaError(format!("invalid pattern: {}", e)))?;

    let is_match = |value: &Bson| -> DataResult<bool> {
        match value {
            Bson::String(s) => re.is_match(s).map_err(|e| {
                DataError::MalformedCriteriaError(format!(
                    "pattern '{}' could not be evaluated: {}",
                    pattern, e
                ))
            }),
            _ => Ok(false),
        }
    };
    let first_hit = candidates
        .iter()
        .copied()
        .flat_map(|candidate| match candidate {
            Bson::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .map(|value| is_match(value))
        .find(|hit| !matches!(hit, Ok(false)));
    Ok(first_hit.transpose()?.is_some())
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(i) => *i != 0,
        Bson::Int64(i) => *i != 0,
        Bson::Double(f) => *f != 0.0,
        Bson::Null => false,
        _ => true,
    }
}

fn is_number(value: &Bson) -> bool {
    matches!(value, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

fn as_f64(value: &Bson) -> f64 {
    match value {
        Bson::Int32(i) => *i as f64,
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        _ => f64::NAN,
    }
}

/// 정렬과 비교 연산에 쓰는 BSON 값 순서
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if is_number(a) && is_number(b) {
        return as_f64(a).total_cmp(&as_f64(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        _ => 12,
    }
}

/// 정렬 문서(`{field: 1 | -1}`)에 따라 두 문서를 비교합니다. 없는 필드가 먼저 옵니다.
pub fn compare_documents(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (field, direction) in sort {
        let va = resolve_path(a, field).into_iter().next();
        let vb = resolve_path(b, field).into_iter().next();
        let ord = match (va, vb) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if as_f64(direction) < 0.0 { ord.reverse() } else { ord };
        }
    }
    Ordering::Equal
}

/// 프로젝션 문서를 적용합니다.
///
/// 값이 참인 필드가 하나라도 있으면 include 모드이며 `_id` 는 명시적으로
/// 제외하지 않는 한 포함됩니다. 그 외에는 exclude 모드입니다.
pub fn project(doc: &Document, projection: &Document) -> Document {
    if projection.is_empty() {
        return doc.clone();
    }
    let include_mode = projection.values().any(truthy);

    if include_mode {
        let mut out = Document::new();
        if projection.get("_id").is_none_or(truthy) {
            if let Some(id) = doc.get("_id") {
                out.insert("_id", id.clone());
            }
        }
        for (field, flag) in projection {
            if field == "_id" || !truthy(flag) {
                continue;
            }
            if let Some(value) = get_path(doc, field) {
                set_path(&mut out, field, value.clone());
            }
        }
        out
    } else {
        let mut out = doc.clone();
        for field in projection.keys() {
            remove_path(&mut out, field);
        }
        out
    }
}

/// 업데이트 문서를 적용합니다. 문서가 실제로 바뀌었으면 `true`.
pub fn apply_update(doc: &mut Document, update: &Document) -> DataResult<bool> {
    if update.is_empty() || !update.keys().all(|k| k.starts_with('$')) {
        return Err(DataError::ValidationError(
            "update document must consist of update operators".to_string(),
        ));
    }
    let before = doc.clone();

    for (op, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(DataError::MalformedCriteriaError(format!(
                "{} requires a document of fields",
                op
            )));
        };
        for (path, value) in fields {
            match op.as_str() {
                "$set" => set_path(doc, path, value.clone()),
                "$unset" => {
                    remove_path(doc, path);
                }
                "$inc" => {
                    let current = get_path(doc, path).cloned().unwrap_or(Bson::Int32(0));
                    set_path(doc, path, add_numbers(path, &current, value)?);
                }
                "$addToSet" => {
                    let mut items = array_at(doc, path)?;
                    if !items.iter().any(|i| values_equal(i, value)) {
                        items.push(value.clone());
                    }
                    set_path(doc, path, Bson::Array(items));
                }
                "$push" => {
                    let mut items = array_at(doc, path)?;
                    items.push(value.clone());
                    set_path(doc, path, Bson::Array(items));
                }
                "$pull" => {
                    if get_path(doc, path).is_some() {
                        let mut items = array_at(doc, path)?;
                        items.retain(|i| !values_equal(i, value));
                        set_path(doc, path, Bson::Array(items));
                    }
                }
                other => {
                    return Err(DataError::MalformedCriteriaError(format!(
                        "unsupported update operator {}",
                        other
                    )));
                }
            }
        }
    }

    Ok(*doc != before)
}

fn add_numbers(path: &str, current: &Bson, amount: &Bson) -> DataResult<Bson> {
    let sum = match (current, amount) {
        (Bson::Int32(a), Bson::Int32(b)) => a
            .checked_add(*b)
            .map(Bson::Int32)
            .unwrap_or(Bson::Int64(i64::from(*a) + i64::from(*b))),
        (Bson::Int32(a), Bson::Int64(b)) => Bson::Int64(checked_long(path, i64::from(*a), *b)?),
        (Bson::Int64(a), Bson::Int32(b)) => Bson::Int64(checked_long(path, *a, i64::from(*b))?),
        (Bson::Int64(a), Bson::Int64(b)) => Bson::Int64(checked_long(path, *a, *b)?),
        (a, b) if is_number(a) && is_number(b) => Bson::Double(as_f64(a) + as_f64(b)),
        _ => {
            return Err(DataError::ValidationError(format!(
                "cannot apply $inc to non-numeric field '{}'",
                path
            )));
        }
    };
    Ok(sum)
}

fn checked_long(path: &str, a: i64, b: i64) -> DataResult<i64> {
    a.checked_add(b).ok_or_else(|| {
        DataError::ValidationError(format!(
            "$inc on '{}' would overflow a 64-bit integer: {} + {}",
            path, a, b
        ))
    })
}

fn array_at(doc: &Document, path: &str) -> DataResult<Vec<Bson>> {
    match get_path(doc, path) {
        None | Some(Bson::Null) => Ok(Vec::new()),
        Some(Bson::Array(items)) => Ok(items.clone()),
        Some(_) => Err(DataError::ValidationError(format!(
            "field '{}' is not an array",
            path
        ))),
    }
}

fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    match path.split_once('.') {
        None => doc.get(path),
        Some((head, rest)) => match doc.get(head) {
            Some(Bson::Document(inner)) => get_path(inner, rest),
            _ => None,
        },
    }
}

fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
    }
}

fn remove_path(doc: &mut Document, path: &str) -> Option<Bson> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head) {
            Some(Bson::Document(inner)) => remove_path(inner, rest),
            _ => None,
        },
    }
}
