mod common;

use common::{run, run_err, runtime_err};
use pseudo::interpreter::{Error, RuntimeError};

const PETS: &str = r#"
class Pet
    private name
    public procedure new(petName)
        print("Pet constructor")
        name = petName
    endprocedure
    public function getName()
        return name
    endfunction
    public function describe()
        return "a pet called " + name
    endfunction
endclass

class Dog inherits Pet
    private breed
    public procedure new(petName, dogBreed)
        super.new(petName)
        print("Dog constructor")
        breed = dogBreed
    endprocedure
    public function describe()
        return getName() + " the " + breed
    endfunction
endclass
"#;

fn with_pets(body: &str) -> String {
    format!("{}\n{}", PETS, body)
}

#[test]
fn test_super_constructor_runs_before_subclass_body() {
    let output = run(&with_pets("let d = new Dog(\"Rex\", \"beagle\")"));
    assert_eq!(output, vec!["Pet constructor", "Dog constructor"]);
}

#[test]
fn test_inherited_attributes_are_initialized_by_base_constructor() {
    let output = run(&with_pets("let d = new Dog(\"Rex\", \"beagle\")\nprint(d.getName())"));
    assert_eq!(output.last().map(String::as_str), Some("Rex"));
}

#[test]
fn test_subclass_overrides_method() {
    let output = run(&with_pets(
        "let d = new Dog(\"Rex\", \"beagle\")\nlet p = new Pet(\"Tom\")\nprint(d.describe())\nprint(p.describe())",
    ));
    assert_eq!(&output[output.len() - 2..], ["Rex the beagle", "a pet called Tom"]);
}

#[test]
fn test_constructor_is_inherited() {
    let source = with_pets("class Cat inherits Pet\nendclass\nlet c = new Cat(\"Felix\")\nprint(c.getName())");
    assert_eq!(run(&source), vec!["Pet constructor", "Felix"]);
}

#[test]
fn test_private_attribute_is_hidden_from_outside() {
    let error = runtime_err(&with_pets("let d = new Dog(\"Rex\", \"beagle\")\nprint(d.breed)"));
    match error {
        RuntimeError::PrivateMember { member, class, .. } => {
            assert_eq!(member, "breed");
            assert_eq!(class, "Dog");
        }
        other => panic!("expected private member error, got {:?}", other),
    }

    let error = runtime_err(&with_pets("let d = new Dog(\"Rex\", \"beagle\")\nprint(d.name)"));
    assert!(matches!(error, RuntimeError::PrivateMember { .. }));
}

#[test]
fn test_private_method_callable_from_inside_only() {
    let source = r#"
class Safe
    private function secret()
        return 42
    endfunction
    public function reveal()
        return secret()
    endfunction
endclass
let s = new Safe()
print(s.reveal())
"#;
    assert_eq!(run(source), vec!["42"]);

    let error = runtime_err(&format!("{}\ns.secret()", source));
    assert!(matches!(error, RuntimeError::PrivateMember { .. }));
}

#[test]
fn test_public_attributes_are_shared_between_aliases() {
    let source = r#"
class Point
    public x
    public y
    public procedure new(px, py)
        x = px
        y = py
    endprocedure
endclass
let p = new Point(1, 2)
let q = p
q.y = 5
p.x = 10
print(p.x, p.y)
let other = new Point(0, 0)
print(other.x)
"#;
    assert_eq!(run(source), vec!["10 5", "0"]);
}

#[test]
fn test_attributes_start_as_null() {
    let source = "class Box\n public content\nendclass\nlet b = new Box()\nprint(b.content)\nprint(b)";
    assert_eq!(run(source), vec!["null", "<Box instance>"]);
}

#[test]
fn test_arguments_without_constructor() {
    let error = runtime_err("class Box\n public content\nendclass\nnew Box(1)");
    assert!(matches!(error, RuntimeError::Arity { expected: 0, found: 1, .. }));
}

#[test]
fn test_constructor_arity_is_checked() {
    let error = runtime_err(&with_pets("new Pet()"));
    assert!(matches!(error, RuntimeError::Arity { expected: 1, found: 0, .. }));
}

#[test]
fn test_methods_cannot_be_reassigned() {
    let error = runtime_err(&with_pets("let p = new Pet(\"Tom\")\np.describe = 1"));
    assert!(error.to_string().contains("method"));
}

#[test]
fn test_unknown_member() {
    let error = runtime_err(&with_pets("let p = new Pet(\"Tom\")\np.age"));
    assert!(error.to_string().contains("no member"));
}

#[test]
fn test_new_requires_a_class() {
    let error = runtime_err("let notAClass = 3\nnew notAClass()");
    assert!(matches!(error, RuntimeError::TypeError { .. }));
}

#[test]
fn test_class_cannot_inherit_from_itself() {
    let error = runtime_err("class Loop inherits Loop\nendclass");
    assert!(error.to_string().contains("itself"));
}

#[test]
fn test_parent_must_be_declared_first() {
    let error = run_err("class Dog inherits Animal\nendclass");
    assert!(matches!(error, Error::Runtime(RuntimeError::UndefinedVariable { .. })));
}

#[test]
fn test_methods_read_globals() {
    let source = r#"
let greeting = "Hi"
class Greeter
    public function greet(who)
        return greeting + " " + who
    endfunction
endclass
print(new Greeter().greet("Ada"))
"#;
    assert_eq!(run(source), vec!["Hi Ada"]);
}
