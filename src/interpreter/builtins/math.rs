use rand::Rng;

use super::super::environment::Environment;
use super::super::error::RuntimeError;
use super::super::host::Host;
use super::require_args;
use crate::value::Value;

/// `random(from, to)`: an integer in `[from, to]` or a float in `[from, to)`.
/// Both bounds must have the same numeric type.
pub fn random(args: &[Value], _scope: &Environment, host: &mut Host) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "random");
    match (&args[0], &args[1]) {
        (Value::Integer(from), Value::Integer(to)) => {
            if from > to {
                return Err(RuntimeError::invalid_operation("random: `from` must not be greater than `to`"));
            }
            Ok(Value::Integer(host.rng.gen_range(*from..=*to)))
        }
        (Value::Float(from), Value::Float(to)) => {
            if from > to {
                return Err(RuntimeError::invalid_operation("random: `from` must not be greater than `to`"));
            }
            if from == to {
                return Ok(Value::Float(*from));
            }
            Ok(Value::Float(host.rng.gen_range(*from..*to)))
        }
        (from, to) => Err(RuntimeError::type_error(format!(
            "from and to parameters of random must both be integers or both be floats, found {} and {}",
            from.type_name(),
            to.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_is_inclusive() {
        let (mut host, _) = Host::buffered();
        host.reseed(7);
        let scope = Environment::new();
        for _ in 0..100 {
            let value = random(&[Value::Integer(1), Value::Integer(3)], &scope, &mut host).unwrap();
            let n = value.as_integer().unwrap();
            assert!((1..=3).contains(&n));
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let scope = Environment::new();
        let draw = |seed| {
            let (mut host, _) = Host::buffered();
            host.reseed(seed);
            (0..5)
                .map(|_| random(&[Value::Float(0.0), Value::Float(1.0)], &scope, &mut host).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_mixed_types_rejected() {
        let (mut host, _) = Host::buffered();
        let scope = Environment::new();
        assert!(random(&[Value::Integer(1), Value::Float(2.0)], &scope, &mut host).is_err());
    }
}
