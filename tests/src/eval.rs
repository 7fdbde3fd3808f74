use insta::assert_snapshot;

#[track_caller]
fn _eval(source: &str) -> String {
    crate::init_logger();

    let program = spvsl_compiler::parse(source).unwrap_or_else(|e| panic!("{e}"));
    match program.expression.get_constant() {
        Some(value) => value.to_string(),
        None => "not constant".to_string(),
    }
}

#[test]
fn arithmetic() {
    assert_snapshot!(_eval("1 + 2 * 3"), @"7");
    assert_snapshot!(_eval("7u - 2u"), @"5u");
    assert_snapshot!(_eval("7 / 2"), @"3");
    assert_snapshot!(_eval("1 + 0.5"), @"1.5");
    assert_snapshot!(_eval("0.5lf * 3"), @"1.5lf");
    assert_snapshot!(_eval("2147483647 + 1"), @"-2147483648");
}

#[test]
fn linear_algebra() {
    assert_snapshot!(_eval("mat2(1.0, 2.0, 3.0, 4.0) * vec2(1.0, 1.0)"), @"vec2(4.0, 6.0)");
    assert_snapshot!(_eval("vec2(1.0, 1.0) * mat2(1.0, 2.0, 3.0, 4.0)"), @"vec2(3.0, 7.0)");
    assert_snapshot!(_eval("mat2(2.0) * mat2(3.0)"), @"mat2(6.0, 0.0, 0.0, 6.0)");
    assert_snapshot!(_eval("vec3(1.0, 2.0, 3.0) / 2.0"), @"vec3(0.5, 1.0, 1.5)");
}

#[test]
fn constructors_and_swizzles() {
    assert_snapshot!(_eval("vec4(vec2(1.0, 2.0), 3, true)"), @"vec4(1.0, 2.0, 3.0, 1.0)");
    assert_snapshot!(_eval("mat3(mat2(2.0))"), @"mat3(2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0)");
    assert_snapshot!(_eval("ivec2(1.5, -2.5)"), @"ivec2(1, -2)");
    assert_snapshot!(_eval("vec4(1.0, 2.0, 3.0, 4.0).wx.yyx"), @"vec3(1.0, 1.0, 4.0)");
    assert_snapshot!(_eval("2.0.xxx"), @"vec3(2.0, 2.0, 2.0)");
}

#[test]
fn declarations() {
    assert_snapshot!(_eval("const vec2 v = vec2(1.0, 2.0); v.yx * 2.0"), @"vec2(4.0, 2.0)");
    assert_snapshot!(
        _eval("struct Light { vec3 color; float power; }; const Light l = Light(vec3(1.0), 2.0); l.color * l.power"),
        @"vec3(2.0, 2.0, 2.0)"
    );
    assert_snapshot!(_eval("float x; x + 1.0"), @"not constant");
    assert_snapshot!(_eval("1 < 2"), @"not constant");
}

#[test]
fn native_functions() {
    assert_snapshot!(_eval("sqrt(16.0)"), @"4.0");
    assert_snapshot!(_eval("mod(7.0, 3.0)"), @"1.0");
    assert_snapshot!(_eval("mod(-1.0, 3.0)"), @"2.0");
    assert_snapshot!(_eval("clamp(5, 0, 3)"), @"3");
    assert_snapshot!(_eval("abs(-3)"), @"3");
    assert_snapshot!(_eval("dot(vec2(1.0, 2.0), vec2(3.0, 4.0))"), @"11.0");
    assert_snapshot!(_eval("length(vec2(3.0, 4.0))"), @"5.0");
    assert_snapshot!(_eval("normalize(vec2(3.0, 4.0))"), @"vec2(0.6, 0.8)");
    assert_snapshot!(
        _eval("cross(vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0))"),
        @"vec3(0.0, 0.0, 1.0)"
    );
    assert_snapshot!(_eval("mix(0.0, 10.0, 0.25)"), @"2.5");
    assert_snapshot!(_eval("step(0.5, vec2(0.2, 0.8))"), @"vec2(0.0, 1.0)");
    assert_snapshot!(_eval("isnan(1.0)"), @"false");
}
