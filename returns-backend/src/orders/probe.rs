//! First-success probing over an ordered list of strategies

use std::future::Future;

/// Result of [`try_in_order`]
#[derive(Debug)]
pub enum Probe<'a, S, T, E> {
    /// The first strategy whose result passed `accept`
    Accepted { strategy: &'a S, index: usize, value: T },
    /// No strategy was accepted. `rejected` answered but failed `accept`,
    /// `failed` errored.
    Exhausted {
        rejected: Vec<&'a S>,
        failed: Vec<(&'a S, E)>,
    },
}

/// Run `attempt` for each strategy in order, stopping at the first result
/// that `accept` approves. Strategies after it are never attempted.
pub async fn try_in_order<'a, S, T, E, F, Fut, P>(
    strategies: &'a [S],
    mut attempt: F,
    mut accept: P,
) -> Probe<'a, S, T, E>
where
    F: FnMut(&'a S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    let mut rejected = Vec::new();
    let mut failed = Vec::new();

    for (index, strategy) in strategies.iter().enumerate() {
        match attempt(strategy).await {
            Ok(value) if accept(&value) => {
                return Probe::Accepted { strategy, index, value };
            }
            Ok(_) => rejected.push(strategy),
            Err(e) => failed.push((strategy, e)),
        }
    }

    Probe::Exhausted { rejected, failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_stops_at_first_accepted() {
        let calls = RefCell::new(Vec::new());
        let strategies = [0usize, 0, 3, 5];

        let probe = try_in_order(
            &strategies,
            |s| {
                calls.borrow_mut().push(*s);
                async move { Ok::<usize, String>(*s) }
            },
            |n| *n > 0,
        )
        .await;

        match probe {
            Probe::Accepted { index, value, .. } => {
                assert_eq!(index, 2);
                assert_eq!(value, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(*calls.borrow(), vec![0, 0, 3]);
    }

    #[tokio::test]
    async fn test_exhausted_separates_rejections_from_errors() {
        let strategies = ["empty", "boom", "empty"];

        let probe = try_in_order(
            &strategies,
            |s| async move {
                if *s == "boom" {
                    Err("upstream down".to_string())
                } else {
                    Ok(Vec::<u8>::new())
                }
            },
            |v| !v.is_empty(),
        )
        .await;

        match probe {
            Probe::Exhausted { rejected, failed } => {
                assert_eq!(rejected.len(), 2);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].1, "upstream down");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_strategy_list() {
        let strategies: [u8; 0] = [];
        let probe = try_in_order(&strategies, |_| async { Ok::<u8, ()>(1) }, |_| true).await;
        assert!(matches!(probe, Probe::Exhausted { ref rejected, ref failed } if rejected.is_empty() && failed.is_empty()));
    }
}
