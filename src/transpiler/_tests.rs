#[cfg(test)]
pub mod fixtures {
    use serde_json::{json, Value};

    /// Payroll statements as the backend issues them, with their parameters.
    pub fn payroll_statements() -> Vec<(&'static str, Vec<Value>)> {
        vec![
            ("SELECT * FROM employee", vec![]),
            ("SELECT `id`, `full_name` FROM `employee` WHERE `dept_id` = ? AND active = ?", vec![json!(3), json!(true)]),
            (
                "SELECT e.id, CONCAT(e.first_name, ' ', e.last_name) AS name FROM employee e ORDER BY e.last_name LIMIT ? OFFSET ?",
                vec![json!(25), json!(50)],
            ),
            (
                "SELECT DATE_FORMAT(pay_date, '%Y-%m') AS period, SUM(IFNULL(gross, 0)) AS total FROM payslip WHERE company_id = ? GROUP BY period LIMIT 12",
                vec![json!("acme")],
            ),
            (
                "SELECT LPAD(code, 6, '0') AS code, TRIM(description) FROM pay_item WHERE updated_at > ? LIMIT ?, ?",
                vec![json!("2024-01-01 00:00:00"), json!(0), json!(100)],
            ),
            (
                "SELECT x.dept_id, x.n FROM (SELECT dept_id, COUNT(*) AS n FROM employee WHERE hired_at < NOW() GROUP BY dept_id) x WHERE x.n > ?",
                vec![json!(10)],
            ),
            (
                "UPDATE payslip SET status = ?, approved_at = NOW() WHERE id = ? AND note <> 'why?'",
                vec![json!("approved"), json!(99)],
            ),
            ("CREATE TABLE IF NOT EXISTS `audit_log` (`id` INT, `at` DATETIME)", vec![]),
        ]
    }
}

#[cfg(test)]
pub mod pipeline_tests {
    use serde_json::json;

    use crate::{
        error::{Pass, TranspileError},
        parser::PlaceholderLocator,
        transpiler::{_tests::fixtures, Transpiler},
        SqlValue, TranspilerConfig,
    };

    #[test]
    pub fn test_no_placeholders_no_params() {
        let result = Transpiler::default()
            .transpile("SELECT * FROM employee WHERE note = '?'", vec![])
            .expect("Failed to transpile");

        assert_eq!(result.sql, "SELECT * FROM employee WHERE note = '?'");
        assert!(result.params.is_empty());
        assert!(result.occurrences.is_empty());
    }

    #[test]
    pub fn test_markers_match_params_for_payroll_statements() {
        let transpiler = Transpiler::default();

        for (sql, params) in fixtures::payroll_statements() {
            let result = transpiler.transpile_json(sql, &params).expect("Failed to transpile");

            assert_eq!(result.params.len(), params.len(), "{}", sql);
            assert_eq!(result.occurrences.len(), result.params.len(), "{}", result.sql);
            assert_eq!(PlaceholderLocator::count(&result.sql).expect("Failed to count"), 0, "{}", result.sql);
            for (i, occurrence) in result.occurrences.iter().enumerate() {
                assert_eq!(occurrence.name.as_deref(), Some(format!("@p{}", i + 1).as_str()));
            }
        }
    }

    #[test]
    pub fn test_limit_only() {
        let result = Transpiler::default().transpile("SELECT * FROM t LIMIT 10", vec![]).expect("Failed to transpile");

        assert_eq!(result.sql, "SELECT * FROM t ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY");
    }

    #[test]
    pub fn test_limit_offset_forms() {
        let transpiler = Transpiler::default();

        let result = transpiler.transpile("SELECT * FROM t ORDER BY id LIMIT 10 OFFSET 5", vec![]).expect("Failed to transpile");
        assert_eq!(result.sql, "SELECT * FROM t ORDER BY id OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY");

        let result = transpiler.transpile("SELECT * FROM t ORDER BY id LIMIT 5, 10", vec![]).expect("Failed to transpile");
        assert_eq!(result.sql, "SELECT * FROM t ORDER BY id OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY");
    }

    #[test]
    pub fn test_limit_params_are_swapped_and_named() {
        let result = Transpiler::default()
            .transpile(
                "SELECT * FROM t WHERE a = ? LIMIT ? OFFSET ?",
                vec![SqlValue::from("X"), SqlValue::Int(10), SqlValue::Int(5)],
            )
            .expect("Failed to transpile");

        assert_eq!(
            result.sql,
            "SELECT * FROM t WHERE a = @p1 ORDER BY (SELECT NULL) OFFSET @p2 ROWS FETCH NEXT @p3 ROWS ONLY"
        );
        assert_eq!(result.params, vec![SqlValue::from("X"), SqlValue::Int(5), SqlValue::Int(10)]);

        let bindings: Vec<(&str, &SqlValue)> = result.bindings().collect();
        assert_eq!(bindings[1], ("@p2", &SqlValue::Int(5)));
    }

    #[test]
    pub fn test_basic_substitutions() {
        let result = Transpiler::default()
            .transpile("SELECT `col`, IFNULL(a,b), NOW() FROM t", vec![])
            .expect("Failed to transpile");

        assert_eq!(result.sql, "SELECT [col], ISNULL(a,b), GETDATE() FROM t");
    }

    #[test]
    pub fn test_group_by_alias() {
        let result = Transpiler::default()
            .transpile("SELECT a+b AS total, c FROM t GROUP BY total", vec![])
            .expect("Failed to transpile");

        assert_eq!(result.sql, "SELECT a+b AS total, c FROM t GROUP BY a+b");
    }

    #[test]
    pub fn test_payroll_report() {
        let result = Transpiler::default()
            .transpile_json(
                "SELECT e.`dept_id`, DATE_FORMAT(p.`pay_date`, '%Y-%m-%d') AS pay_day, SUM(IFNULL(p.amount, 0)) total \
                 FROM `payslip` p JOIN (SELECT id, dept_id FROM employee WHERE active = ?) e ON e.id = p.employee_id \
                 WHERE p.pay_date >= ? GROUP BY e.dept_id, pay_day LIMIT ?, ?",
                &[json!(true), json!("2024-01-01"), json!(0), json!(50)],
            )
            .expect("Failed to transpile");

        assert_eq!(
            result.sql,
            "SELECT e.[dept_id], CONVERT(VARCHAR(10), p.[pay_date], 23) AS pay_day, SUM(ISNULL(p.amount, 0)) total \
             FROM [payslip] p JOIN (SELECT id, dept_id FROM employee WHERE active = @p1) AS e ON e.id = p.employee_id \
             WHERE p.pay_date >= @p2 GROUP BY e.dept_id, CONVERT(VARCHAR(10), p.[pay_date], 23) \
             ORDER BY (SELECT NULL) OFFSET @p3 ROWS FETCH NEXT @p4 ROWS ONLY"
        );
        assert_eq!(
            result.params,
            vec![SqlValue::Bool(true), SqlValue::from("2024-01-01"), SqlValue::Int(0), SqlValue::Int(50)]
        );
    }

    #[test]
    pub fn test_grouped_expression_params_are_bound_twice() {
        let result = Transpiler::default()
            .transpile(
                "SELECT IF(gross > ?, 'high', 'low') AS band, COUNT(*) AS n FROM payslip GROUP BY band LIMIT ?",
                vec![SqlValue::Int(5000), SqlValue::Int(10)],
            )
            .expect("Failed to transpile");

        assert_eq!(
            result.sql,
            "SELECT IIF(gross > @p1, 'high', 'low') AS band, COUNT(*) AS n FROM payslip \
             GROUP BY IIF(gross > @p2, 'high', 'low') ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT @p3 ROWS ONLY"
        );
        assert_eq!(result.params, vec![SqlValue::Int(5000), SqlValue::Int(5000), SqlValue::Int(10)]);
    }

    #[test]
    pub fn test_misaligned_input() {
        let result = Transpiler::default().transpile("SELECT * FROM t WHERE a = ? AND b = ?", vec![SqlValue::Int(1)]);

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.pass(), Pass::Locate);
                assert!(matches!(err, TranspileError::ParameterMismatch { expected: 1, found: 2, .. }));
            },
        }
    }

    #[test]
    pub fn test_padding_length_param_is_bound_per_use() {
        let result = Transpiler::default()
            .transpile("SELECT LPAD(emp_no, ?, '0') FROM employee", vec![SqlValue::Int(6)])
            .expect("Failed to transpile");

        assert_eq!(
            result.sql,
            "SELECT RIGHT(REPLICATE('0', @p1) + LEFT(CAST(emp_no AS NVARCHAR(MAX)), @p2), @p3) FROM employee"
        );
        assert_eq!(result.params, vec![SqlValue::Int(6), SqlValue::Int(6), SqlValue::Int(6)]);
    }

    #[test]
    pub fn test_padding_subject_and_pad_params_keep_their_values() {
        let result = Transpiler::default()
            .transpile("SELECT LPAD(?, 4, ?)", vec![SqlValue::from("7"), SqlValue::from("0")])
            .expect("Failed to transpile");

        assert_eq!(result.sql, "SELECT RIGHT(REPLICATE(@p1, 4) + LEFT(CAST(@p2 AS NVARCHAR(MAX)), 4), 4)");
        assert_eq!(result.params, vec![SqlValue::from("0"), SqlValue::from("7")]);
    }

    #[test]
    pub fn test_group_by_concat_alias() {
        let result = Transpiler::default()
            .transpile(
                "SELECT CONCAT(first_name, ' ', last_name) full_name, COUNT(*) FROM employee GROUP BY full_name",
                vec![],
            )
            .expect("Failed to transpile");

        let name = "(CAST(first_name AS NVARCHAR(MAX)) + CAST(' ' AS NVARCHAR(MAX)) + CAST(last_name AS NVARCHAR(MAX)))";
        assert_eq!(
            result.sql,
            format!("SELECT {name} AS full_name, COUNT(*) FROM employee GROUP BY {name}")
        );

        let result = Transpiler::default()
            .transpile("SELECT CURRENT_TIMESTAMP() ts, COUNT(*) FROM t GROUP BY ts", vec![])
            .expect("Failed to transpile");
        assert_eq!(result.sql, "SELECT CURRENT_TIMESTAMP ts, COUNT(*) FROM t GROUP BY CURRENT_TIMESTAMP");
    }

    #[test]
    pub fn test_group_by_ordinal_of_aliased_column() {
        let result = Transpiler::default()
            .transpile("SELECT dept d, COUNT(*) n FROM employee GROUP BY 1", vec![])
            .expect("Failed to transpile");

        assert_eq!(result.sql, "SELECT dept d, COUNT(*) n FROM employee GROUP BY dept");
    }

    #[test]
    pub fn test_trailing_backslash_literal() {
        let result = Transpiler::default()
            .transpile(r"SELECT * FROM t WHERE path = 'C:\\' AND id = ?", vec![SqlValue::Int(1)])
            .expect("Failed to transpile");

        assert_eq!(result.sql, r"SELECT * FROM t WHERE path = 'C:\' AND id = @p1");
        assert_eq!(result.params, vec![SqlValue::Int(1)]);
    }

    #[test]
    pub fn test_unbalanced_parentheses() {
        let result = Transpiler::default().transpile("SELECT CONCAT(a, (b) FROM t", vec![]);

        match result {
            Ok(_) => panic!(),
            Err(err) => assert!(matches!(err, TranspileError::UnbalancedParentheses { .. })),
        }
    }

    #[test]
    pub fn test_strict_pagination() {
        let transpiler = Transpiler::new(TranspilerConfig::default().strict());

        let result = transpiler.transpile("SELECT * FROM t LIMIT ? + 1", vec![SqlValue::Int(1)]);

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.pass(), Pass::Pagination);
                assert!(err.to_string().contains("LIMIT ? + 1"));
            },
        }

        let lenient = Transpiler::default()
            .transpile("SELECT * FROM t LIMIT ? + 1", vec![SqlValue::Int(1)])
            .expect("Failed to transpile");
        assert_eq!(lenient.sql, "SELECT * FROM t LIMIT @p1 + 1");
    }

    #[test]
    pub fn test_custom_prefix() {
        let transpiler = Transpiler::new(TranspilerConfig::default().with_param_prefix("@arg"));

        let result = transpiler.transpile("DELETE FROM t WHERE id = ?", vec![SqlValue::Int(1)]).expect("Failed to transpile");

        assert_eq!(result.sql, "DELETE FROM t WHERE id = @arg1");
        assert_eq!(transpiler.config().param_prefix, "@arg");
    }

    #[test]
    pub fn test_pass_order() {
        assert_eq!(
            Transpiler::default().passes(),
            vec![Pass::Pagination, Pass::Functions, Pass::GroupingAliases, Pass::SubqueryAliases]
        );
    }

    #[test]
    pub fn test_shared_across_threads() {
        let transpiler = Transpiler::default();

        std::thread::scope(|scope| {
            for n in 0..8i64 {
                let transpiler = &transpiler;
                scope.spawn(move || {
                    let result = transpiler
                        .transpile(
                            "SELECT * FROM payslip WHERE employee_id = ? LIMIT ? OFFSET ?",
                            vec![SqlValue::Int(n), SqlValue::Int(10), SqlValue::Int(20)],
                        )
                        .expect("Failed to transpile");

                    assert_eq!(result.params, vec![SqlValue::Int(n), SqlValue::Int(20), SqlValue::Int(10)]);
                });
            }
        });
    }
}
