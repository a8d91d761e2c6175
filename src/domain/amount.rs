//! 金额精度规范化
//!
//! Block.io 要求金额固定 8 位小数。`amounts` 字段是逗号分隔的金额列表，
//! 转发前逐个按 `amount + 0`（scale = 8）重新格式化。
//! 超出 8 位的部分向零截断，与上游 SDK 使用的定点加法一致。

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::{
    errors::{WalletError, WalletResult},
    parameters::{ParameterSet, AMOUNTS_FIELD},
};

/// 金额小数位数
pub const AMOUNT_SCALE: u32 = 8;

/// 解析单个金额字符串（只接受普通十进制写法）
pub fn parse_amount(raw: &str) -> WalletResult<Decimal> {
    let canonical = canonical_decimal(raw).ok_or_else(|| WalletError::invalid_amount(raw))?;
    Decimal::from_str(&canonical).map_err(|_| WalletError::invalid_amount(raw))
}

/// 渲染为固定 8 位小数
pub fn render_amount(value: Decimal) -> String {
    let mut fixed = value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero);
    fixed.rescale(AMOUNT_SCALE);
    if fixed.is_zero() {
        fixed.set_sign_positive(true);
    }
    fixed.to_string()
}

/// 格式化单个金额：`" 2.5"` -> `"2.50000000"`
pub fn format_amount(raw: &str) -> WalletResult<String> {
    let compact = strip_whitespace(raw);
    let value = parse_amount(&compact)?;
    let rendered = render_amount(value);
    // 整数部分过大时 rescale 无法达到 8 位
    if !has_fixed_scale(&rendered) {
        return Err(WalletError::invalid_amount(raw));
    }
    Ok(rendered)
}

/// 规范化参数集中的 `amounts` 字段
///
/// - 去除所有空白，按逗号拆分，逐个格式化为 8 位小数，原顺序拼回
/// - 输出中 `amounts` 位于首位，其余字段保持原有相对顺序
/// - 没有 `amounts` 字段时原样返回
pub fn normalize_amounts(mut params: ParameterSet) -> WalletResult<ParameterSet> {
    let Some(raw) = params.remove(AMOUNTS_FIELD) else {
        return Ok(params);
    };

    let normalized = strip_whitespace(&raw)
        .split(',')
        .map(format_amount)
        .collect::<WalletResult<Vec<_>>>()?
        .join(",");

    tracing::debug!(count = normalized.split(',').count(), "amounts_normalized");

    Ok(ParameterSet::new()
        .with(AMOUNTS_FIELD, normalized)
        .merged_with(params))
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// 只接受 `[+-]digits[.digits]`（整数或小数部分可省略其一），
/// 返回 `-12.5` / `0.5` 这样的规范写法。
/// 小数部分在解析前按字符截到 8 位，`Decimal::from_str` 对超长小数会四舍五入
fn canonical_decimal(s: &str) -> Option<String> {
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));

    let digits_only = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !digits_only(int_part)
        || !digits_only(frac_part)
    {
        return None;
    }
    let frac_part = &frac_part[..frac_part.len().min(AMOUNT_SCALE as usize)];

    let mut out = String::with_capacity(s.len() + 2);
    if negative {
        out.push('-');
    }
    out.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    Some(out)
}

fn has_fixed_scale(rendered: &str) -> bool {
    rendered
        .split_once('.')
        .map(|(_, frac)| frac.len() == AMOUNT_SCALE as usize)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(params: &ParameterSet) -> &str {
        params.get(AMOUNTS_FIELD).unwrap()
    }

    #[test]
    fn test_normalize_basic_list() {
        let params = ParameterSet::new().with("amounts", "1,2.5,0.003");
        let out = normalize_amounts(params).unwrap();
        assert_eq!(amounts(&out), "1.00000000,2.50000000,0.00300000");
    }

    #[test]
    fn test_normalize_strips_whitespace() {
        let params = ParameterSet::new().with("amounts", " 1 , 2 ");
        let out = normalize_amounts(params).unwrap();
        assert_eq!(amounts(&out), "1.00000000,2.00000000");

        let params = ParameterSet::new().with("amounts", "1,\t2\n,3");
        let out = normalize_amounts(params).unwrap();
        assert_eq!(amounts(&out), "1.00000000,2.00000000,3.00000000");
    }

    #[test]
    fn test_other_fields_preserved_in_order() {
        let params = ParameterSet::new()
            .with("to_addresses", "ADDR1,ADDR2")
            .with("amounts", "0.1, 0.2")
            .with("nonce", " keep me ")
            .with("priority", "high");

        let out = normalize_amounts(params).unwrap();
        let pairs: Vec<_> = out.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("amounts", "0.10000000,0.20000000"),
                ("to_addresses", "ADDR1,ADDR2"),
                ("nonce", " keep me "),
                ("priority", "high"),
            ]
        );
    }

    #[test]
    fn test_missing_amounts_is_noop() {
        let params = ParameterSet::new().with("labels", "a,b").with("x", "1");
        let out = normalize_amounts(params.clone()).unwrap();
        assert_eq!(out, params);
    }

    #[test]
    fn test_extra_precision_truncated() {
        assert_eq!(format_amount("0.123456789").unwrap(), "0.12345678");
        assert_eq!(format_amount("-1.999999999").unwrap(), "-1.99999999");
        assert_eq!(format_amount("-0.000000001").unwrap(), "0.00000000");
    }

    #[test]
    fn test_long_fraction_never_rounds_up() {
        assert_eq!(
            format_amount("0.123456789999999999999999999999").unwrap(),
            "0.12345678"
        );
        assert_eq!(
            format_amount("0.999999999999999999999999999999").unwrap(),
            "0.99999999"
        );
        assert_eq!(
            format_amount("-2.000000009999999999999999999999999").unwrap(),
            "-2.00000000"
        );

        let params =
            ParameterSet::new().with("amounts", "1.999999999999999999999999999999, 3");
        let out = normalize_amounts(params).unwrap();
        assert_eq!(amounts(&out), "1.99999999,3.00000000");
    }

    #[test]
    fn test_sign_and_leading_dot() {
        assert_eq!(format_amount("+3").unwrap(), "3.00000000");
        assert_eq!(format_amount("-3.5").unwrap(), "-3.50000000");
        assert_eq!(format_amount(".5").unwrap(), "0.50000000");
        assert_eq!(format_amount("7.").unwrap(), "7.00000000");
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        for bad in ["", "abc", "1e5", "1_000", "1.2.3", "-", ".", "0x10", "1,5"] {
            let err = format_amount(bad).unwrap_err();
            assert!(
                matches!(err, WalletError::InvalidAmountFormat { .. }),
                "expected InvalidAmountFormat for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_invalid_element_fails_whole_list() {
        let params = ParameterSet::new().with("amounts", "1,,2");
        assert!(matches!(
            normalize_amounts(params),
            Err(WalletError::InvalidAmountFormat { .. })
        ));

        let params = ParameterSet::new().with("amounts", "1,two");
        assert!(normalize_amounts(params).is_err());
    }

    #[test]
    fn test_every_rendered_amount_has_eight_digits() {
        for raw in ["0", "10", "123456.7", "0.00000001", "99999999.12345678"] {
            let rendered = format_amount(raw).unwrap();
            let (_, frac) = rendered.split_once('.').unwrap();
            assert_eq!(frac.len(), 8, "{} -> {}", raw, rendered);
            assert!(!rendered.contains('e') && !rendered.contains('E'));
        }
    }
}
