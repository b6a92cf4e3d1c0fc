//! JSON-driven conformance suite in the layout of the public
//! uritemplate-test corpus: groups of variables plus (template, expected)
//! testcases, where the expected value is a string, a list of acceptable
//! strings, or `false` for templates that must be rejected.

use std::error::Error;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{from_str, Number};

use uri_template_kit::{UriTemplate, Value, Variables};

#[derive(Deserialize)]
#[serde(untagged)]
enum VariableValue {
    Number(Number),
    String(String),
    Array(Vec<String>),
    Object(IndexMap<String, String>),
}

#[derive(Deserialize)]
struct Group {
    variables: IndexMap<String, VariableValue>,
    testcases: Vec<(String, serde_json::Value)>,
}

impl<'a> Variables<'a, Value> for Group {
    fn get(&self, k: &str) -> Option<Value> {
        self.variables.get(k).map(|v| match v {
            VariableValue::Number(n) => Value::from_string(n.to_string()),
            VariableValue::String(s) => Value::from_string(s),
            VariableValue::Array(a) => Value::from_list(a),
            VariableValue::Object(o) => Value::from_assoc(o),
        })
    }
}

fn run(corpus: &str) -> Result<(), Box<dyn Error>> {
    let groups: IndexMap<String, Group> = from_str(corpus)?;
    for (name, group) in &groups {
        for (template, expected) in &group.testcases {
            match expected {
                serde_json::Value::String(right) => {
                    let left = UriTemplate::parse(template)?.expand(group)?;
                    assert_eq!(left, *right, "{}: {}", name, template);
                }
                serde_json::Value::Array(alternatives) => {
                    let left = UriTemplate::parse(template)?.expand(group)?;
                    assert!(
                        alternatives.iter().any(|r| match r {
                            serde_json::Value::String(s) => *s == left,
                            _ => false,
                        }),
                        "{}: {} expanded to {}",
                        name,
                        template,
                        left
                    );
                }
                serde_json::Value::Bool(false) => {
                    let rejected = match UriTemplate::parse(template) {
                        Err(_) => true,
                        Ok(parsed) => parsed.expand(group).is_err(),
                    };
                    assert!(rejected, "{}: {} should have been rejected", name, template);
                }
                _ => Err("invalid JSON testcase")?,
            }
        }
    }
    Ok(())
}

#[test]
fn test_level_1_examples() -> Result<(), Box<dyn Error>> {
    run(r##"{
        "Level 1 Examples": {
            "variables": {"var": "value", "hello": "Hello World!"},
            "testcases": [
                ["{var}", "value"],
                ["{hello}", "Hello%20World%21"]
            ]
        }
    }"##)
}

#[test]
fn test_level_2_examples() -> Result<(), Box<dyn Error>> {
    run(r##"{
        "Level 2 Examples": {
            "variables": {
                "var": "value",
                "hello": "Hello World!",
                "path": "/foo/bar"
            },
            "testcases": [
                ["{+var}", "value"],
                ["{+hello}", "Hello%20World!"],
                ["{+path}/here", "/foo/bar/here"],
                ["here?ref={+path}", "here?ref=/foo/bar"],
                ["X{#var}", "X#value"],
                ["X{#hello}", "X#Hello%20World!"]
            ]
        }
    }"##)
}

#[test]
fn test_level_3_examples() -> Result<(), Box<dyn Error>> {
    run(r##"{
        "Level 3 Examples": {
            "variables": {
                "var": "value",
                "hello": "Hello World!",
                "empty": "",
                "path": "/foo/bar",
                "x": 1024,
                "y": 768
            },
            "testcases": [
                ["map?{x,y}", "map?1024,768"],
                ["{x,hello,y}", "1024,Hello%20World%21,768"],
                ["{+x,hello,y}", "1024,Hello%20World!,768"],
                ["{+path,x}/here", "/foo/bar,1024/here"],
                ["{#x,hello,y}", "#1024,Hello%20World!,768"],
                ["{#path,x}/here", "#/foo/bar,1024/here"],
                ["X{.var}", "X.value"],
                ["X{.x,y}", "X.1024.768"],
                ["{/var}", "/value"],
                ["{/var,x}/here", "/value/1024/here"],
                ["{;x,y}", ";x=1024;y=768"],
                ["{;x,y,empty}", ";x=1024;y=768;empty"],
                ["{?x,y}", "?x=1024&y=768"],
                ["{?x,y,empty}", "?x=1024&y=768&empty="],
                ["?fixed=yes{&x}", "?fixed=yes&x=1024"],
                ["{&x,y,empty}", "&x=1024&y=768&empty="]
            ]
        }
    }"##)
}

#[test]
fn test_level_4_examples() -> Result<(), Box<dyn Error>> {
    run(r##"{
        "Level 4 Examples": {
            "variables": {
                "var": "value",
                "hello": "Hello World!",
                "path": "/foo/bar",
                "list": ["red", "green", "blue"],
                "keys": {"semi": ";", "dot": ".", "comma": ","}
            },
            "testcases": [
                ["{var:3}", "val"],
                ["{var:30}", "value"],
                ["{list}", "red,green,blue"],
                ["{list*}", "red,green,blue"],
                ["{keys}", "semi,%3B,dot,.,comma,%2C"],
                ["{keys*}", "semi=%3B,dot=.,comma=%2C"],
                ["{+path:6}/here", "/foo/b/here"],
                ["{+list}", "red,green,blue"],
                ["{+list*}", "red,green,blue"],
                ["{+keys}", "semi,;,dot,.,comma,,"],
                ["{+keys*}", "semi=;,dot=.,comma=,"],
                ["{#path:6}/here", "#/foo/b/here"],
                ["{#list}", "#red,green,blue"],
                ["{#list*}", "#red,green,blue"],
                ["{#keys}", "#semi,;,dot,.,comma,,"],
                ["{#keys*}", "#semi=;,dot=.,comma=,"],
                ["X{.var:3}", "X.val"],
                ["X{.list}", "X.red,green,blue"],
                ["X{.list*}", "X.red.green.blue"],
                ["{/var:1,var}", "/v/value"],
                ["{/list}", "/red,green,blue"],
                ["{/list*}", "/red/green/blue"],
                ["{/list*,path:4}", "/red/green/blue/%2Ffoo"],
                ["{;hello:5}", ";hello=Hello"],
                ["{;list}", ";list=red,green,blue"],
                ["{;list*}", ";list=red;list=green;list=blue"],
                ["{;keys}", ";keys=semi,%3B,dot,.,comma,%2C"],
                ["{;keys*}", ";semi=%3B;dot=.;comma=%2C"],
                ["{?var:3}", "?var=val"],
                ["{?list}", "?list=red,green,blue"],
                ["{?list*}", "?list=red&list=green&list=blue"],
                ["{?keys}", "?keys=semi,%3B,dot,.,comma,%2C"],
                ["{?keys*}", "?semi=%3B&dot=.&comma=%2C"],
                ["{&var:3}", "&var=val"],
                ["{&list}", "&list=red,green,blue"],
                ["{&list*}", "&list=red&list=green&list=blue"],
                ["{&keys}", "&keys=semi,%3B,dot,.,comma,%2C"],
                ["{&keys*}", "&semi=%3B&dot=.&comma=%2C"]
            ]
        }
    }"##)
}

#[test]
fn test_negative_cases() -> Result<(), Box<dyn Error>> {
    run(r##"{
        "Failure Tests": {
            "variables": {"var": "value", "list": ["red", "green", "blue"]},
            "testcases": [
                ["{var", false],
                ["var}", false],
                ["{}", false],
                ["{var,,x}", false],
                ["{!var}", false],
                ["{var:0}", false],
                ["{var:10000}", false],
                ["{var:2*}", false],
                ["{list:3}", false]
            ]
        }
    }"##)
}
