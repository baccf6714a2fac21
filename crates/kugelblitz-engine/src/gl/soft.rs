//! In-memory GL backend for tests.
//!
//! Emulates just enough driver behavior to exercise the shader layer without a
//! GPU: a shallow GLSL "compiler" (version directive, brace balance, interface
//! declarations), a linker that matches fragment inputs against vertex outputs,
//! uniform locations, vertex arrays and buffers, a draw-call log, and a driver
//! error queue.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use super::backend::{GlBackend, Stage};

const INVALID_OPERATION: u32 = 0x0502;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct ShaderId(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct ProgramId(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct BufferId(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct VertexArrayId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SoftUniformLocation {
    program: ProgramId,
    name: String,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum UniformValue {
    I32(i32),
    F32(f32),
}

/// A uniform write the driver accepted.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UniformWrite {
    pub program: ProgramId,
    pub name: String,
    pub value: UniformValue,
}

/// A draw call the driver accepted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct DrawCall {
    pub program: ProgramId,
    pub vao: VertexArrayId,
    pub first: i32,
    pub count: i32,
}

#[derive(Debug, Default, Clone)]
struct Interface {
    inputs: Vec<String>,
    outputs: Vec<String>,
    uniforms: Vec<String>,
}

struct SoftShader {
    kind: Stage,
    source: String,
    compiled: Option<Result<Interface, String>>,
}

#[derive(Default)]
struct SoftProgram {
    attached: Vec<ShaderId>,
    linked: Option<Result<Vec<String>, String>>,
}

#[derive(Debug, Copy, Clone)]
struct SoftAttribute {
    location: u32,
    buffer: BufferId,
    components: i32,
    stride: i32,
    offset: i32,
    enabled: bool,
}

#[derive(Default)]
struct SoftVertexArray {
    attributes: Vec<SoftAttribute>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    shaders: HashMap<ShaderId, SoftShader>,
    programs: HashMap<ProgramId, SoftProgram>,
    bound: Option<ProgramId>,
    buffers: HashMap<BufferId, usize>,
    vertex_arrays: HashMap<VertexArrayId, SoftVertexArray>,
    bound_buffer: Option<BufferId>,
    bound_vao: Option<VertexArrayId>,
    draws: Vec<DrawCall>,
    errors: VecDeque<u32>,
    writes: Vec<UniformWrite>,
    deleted_shaders: Vec<ShaderId>,
    deleted_programs: Vec<ProgramId>,
    refuse_programs: bool,
}

impl State {
    fn mint(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub(crate) struct SoftGl {
    state: RefCell<State>,
}

impl SoftGl {
    pub fn bound_program(&self) -> Option<ProgramId> {
        self.state.borrow().bound
    }

    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    pub fn uniform_writes(&self) -> Vec<UniformWrite> {
        self.state.borrow().writes.clone()
    }

    pub fn deleted_programs(&self) -> Vec<ProgramId> {
        self.state.borrow().deleted_programs.clone()
    }

    pub fn deleted_shaders(&self) -> Vec<ShaderId> {
        self.state.borrow().deleted_shaders.clone()
    }

    /// Shader objects created and not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    /// Buffers created and not yet deleted.
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// Vertex arrays created and not yet deleted.
    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    /// Creates and links a minimal program through the regular driver calls.
    pub fn linked_program(&self) -> ProgramId {
        const VS: &str = "#version 330 core\nvoid main()\n{\n}\n";
        const FS: &str = "#version 330 core\nout vec4 FragColor;\nvoid main()\n{\n}\n";

        let program = self.create_program().unwrap();
        for (stage, source) in [(Stage::Vertex, VS), (Stage::Fragment, FS)] {
            let shader = self.create_shader(stage).unwrap();
            self.shader_source(shader, source);
            self.compile_shader(shader);
            self.attach_shader(program, shader);
        }
        self.link_program(program);
        assert!(self.program_link_status(program));
        program
    }

    /// Makes `create_program` fail, as a driver out of handles would.
    pub fn refuse_programs(&self, refuse: bool) {
        self.state.borrow_mut().refuse_programs = refuse;
    }
}

fn compile(source: &str) -> Result<Interface, String> {
    if !source.lines().any(|l| l.trim_start().starts_with("#version")) {
        return Err("0:1(1): error: missing #version directive".to_string());
    }

    let mut depth: i32 = 0;
    let mut last_line = 0;
    for (idx, line) in source.lines().enumerate() {
        last_line = idx + 1;
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("0:{last_line}(1): error: syntax error, unexpected '}}'"));
            }
        }
    }
    if depth != 0 {
        return Err(format!("0:{last_line}(1): error: syntax error, unexpected end of file"));
    }

    let mut iface = Interface::default();
    for line in source.lines() {
        let mut decl = line.trim();
        if decl.starts_with("layout") {
            match decl.find(')') {
                Some(close) => decl = decl[close + 1..].trim_start(),
                None => continue,
            }
        }

        let tokens: Vec<&str> = decl.split_whitespace().collect();
        let [qualifier, _ty, name, ..] = tokens.as_slice() else {
            continue;
        };
        let name = name.trim_end_matches(';').to_string();
        match *qualifier {
            "in" => iface.inputs.push(name),
            "out" => iface.outputs.push(name),
            "uniform" => iface.uniforms.push(name),
            _ => {}
        }
    }
    Ok(iface)
}

fn link(vertex: &Interface, fragment: &Interface) -> Result<Vec<String>, String> {
    for input in &fragment.inputs {
        if !vertex.outputs.contains(input) {
            return Err(format!(
                "error: fragment shader input `{input}' has no matching output in the previous stage"
            ));
        }
    }

    let mut uniforms = vertex.uniforms.clone();
    for u in &fragment.uniforms {
        if !uniforms.contains(u) {
            uniforms.push(u.clone());
        }
    }
    Ok(uniforms)
}

impl GlBackend for SoftGl {
    type Shader = ShaderId;
    type Program = ProgramId;
    type UniformLocation = SoftUniformLocation;
    type Buffer = BufferId;
    type VertexArray = VertexArrayId;

    fn create_shader(&self, kind: Stage) -> Result<ShaderId, String> {
        let mut st = self.state.borrow_mut();
        let id = ShaderId(st.mint());
        st.shaders.insert(
            id,
            SoftShader {
                kind,
                source: String::new(),
                compiled: None,
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.compiled = Some(compile(&s.source));
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        let st = self.state.borrow();
        matches!(st.shaders.get(&shader).and_then(|s| s.compiled.as_ref()), Some(Ok(_)))
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        let st = self.state.borrow();
        match st.shaders.get(&shader).and_then(|s| s.compiled.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: ShaderId) {
        let mut st = self.state.borrow_mut();
        st.shaders.remove(&shader);
        st.deleted_shaders.push(shader);
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let mut st = self.state.borrow_mut();
        if st.refuse_programs {
            return Err("out of program handles".to_string());
        }
        let id = ProgramId(st.mint());
        st.programs.insert(id, SoftProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn link_program(&self, program: ProgramId) {
        let mut st = self.state.borrow_mut();
        let Some(p) = st.programs.get(&program) else {
            return;
        };

        let stage = |kind: Stage| {
            p.attached
                .iter()
                .filter_map(|id| st.shaders.get(id))
                .find(|s| s.kind == kind)
                .and_then(|s| s.compiled.clone())
        };

        let result = match (stage(Stage::Vertex), stage(Stage::Fragment)) {
            (Some(Ok(vs)), Some(Ok(fs))) => link(&vs, &fs),
            _ => Err("error: linking with uncompiled/unspecialized shader".to_string()),
        };

        if let Some(p) = st.programs.get_mut(&program) {
            p.linked = Some(result);
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        let st = self.state.borrow();
        matches!(st.programs.get(&program).and_then(|p| p.linked.as_ref()), Some(Ok(_)))
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        let st = self.state.borrow();
        match st.programs.get(&program).and_then(|p| p.linked.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_program(&self, program: ProgramId) {
        let mut st = self.state.borrow_mut();
        st.programs.remove(&program);
        st.deleted_programs.push(program);
    }

    fn use_program(&self, program: Option<ProgramId>) {
        let mut st = self.state.borrow_mut();
        match program {
            None => st.bound = None,
            Some(id) => {
                let linked = matches!(
                    st.programs.get(&id).and_then(|p| p.linked.as_ref()),
                    Some(Ok(_))
                );
                if linked {
                    st.bound = Some(id);
                } else {
                    st.errors.push_back(INVALID_OPERATION);
                }
            }
        }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<SoftUniformLocation> {
        let st = self.state.borrow();
        let uniforms = match st.programs.get(&program)?.linked.as_ref()? {
            Ok(uniforms) => uniforms,
            Err(_) => return None,
        };
        uniforms.iter().any(|u| u == name).then(|| SoftUniformLocation {
            program,
            name: name.to_string(),
        })
    }

    fn uniform_1_i32(&self, location: Option<&SoftUniformLocation>, value: i32) {
        self.write(location, UniformValue::I32(value));
    }

    fn uniform_1_f32(&self, location: Option<&SoftUniformLocation>, value: f32) {
        self.write(location, UniformValue::F32(value));
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let mut st = self.state.borrow_mut();
        let id = VertexArrayId(st.mint());
        st.vertex_arrays.insert(id, SoftVertexArray::default());
        Ok(id)
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        let mut st = self.state.borrow_mut();
        match vao {
            Some(id) if !st.vertex_arrays.contains_key(&id) => {
                st.errors.push_back(INVALID_OPERATION);
            }
            _ => st.bound_vao = vao,
        }
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        let mut st = self.state.borrow_mut();
        st.vertex_arrays.remove(&vao);
        if st.bound_vao == Some(vao) {
            st.bound_vao = None;
        }
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        let mut st = self.state.borrow_mut();
        let id = BufferId(st.mint());
        st.buffers.insert(id, 0);
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<BufferId>) {
        let mut st = self.state.borrow_mut();
        match buffer {
            Some(id) if !st.buffers.contains_key(&id) => st.errors.push_back(INVALID_OPERATION),
            _ => st.bound_buffer = buffer,
        }
    }

    fn array_buffer_data(&self, data: &[u8]) {
        let mut st = self.state.borrow_mut();
        match st.bound_buffer {
            Some(id) => {
                st.buffers.insert(id, data.len());
            }
            None => st.errors.push_back(INVALID_OPERATION),
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut st = self.state.borrow_mut();
        st.buffers.remove(&buffer);
        if st.bound_buffer == Some(buffer) {
            st.bound_buffer = None;
        }
    }

    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        let mut st = self.state.borrow_mut();
        let (Some(vao), Some(buffer)) = (st.bound_vao, st.bound_buffer) else {
            st.errors.push_back(INVALID_OPERATION);
            return;
        };
        let Some(array) = st.vertex_arrays.get_mut(&vao) else {
            return;
        };
        array.attributes.retain(|a| a.location != location);
        array.attributes.push(SoftAttribute {
            location,
            buffer,
            components,
            stride,
            offset,
            enabled: false,
        });
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        let mut st = self.state.borrow_mut();
        let Some(vao) = st.bound_vao else {
            st.errors.push_back(INVALID_OPERATION);
            return;
        };
        let attribute = st
            .vertex_arrays
            .get_mut(&vao)
            .and_then(|array| array.attributes.iter_mut().find(|a| a.location == location));
        let found = match attribute {
            Some(attribute) => {
                attribute.enabled = true;
                true
            }
            None => false,
        };
        if !found {
            st.errors.push_back(INVALID_OPERATION);
        }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        let mut st = self.state.borrow_mut();
        let (Some(program), Some(vao)) = (st.bound, st.bound_vao) else {
            st.errors.push_back(INVALID_OPERATION);
            return;
        };
        if first < 0 || count < 0 {
            st.errors.push_back(INVALID_OPERATION);
            return;
        }

        // Every enabled attribute must have data for the last vertex drawn.
        let in_bounds = st.vertex_arrays.get(&vao).is_some_and(|array| {
            array.attributes.iter().filter(|a| a.enabled).all(|a| {
                let last = i64::from(first) + i64::from(count) - 1;
                let end = i64::from(a.offset)
                    + last.max(0) * i64::from(a.stride)
                    + i64::from(a.components) * 4;
                let len = st.buffers.get(&a.buffer).copied().unwrap_or(0);
                count == 0 || end <= len as i64
            })
        });
        if !in_bounds {
            st.errors.push_back(INVALID_OPERATION);
            return;
        }

        st.draws.push(DrawCall {
            program,
            vao,
            first,
            count,
        });
    }

    fn take_error(&self) -> Option<u32> {
        self.state.borrow_mut().errors.pop_front()
    }
}

impl SoftGl {
    fn write(&self, location: Option<&SoftUniformLocation>, value: UniformValue) {
        let Some(loc) = location else {
            return;
        };
        let mut st = self.state.borrow_mut();
        // A location is only meaningful for the program it was queried from.
        if st.bound != Some(loc.program) {
            st.errors.push_back(INVALID_OPERATION);
            return;
        }
        st.writes.push(UniformWrite {
            program: loc.program,
            name: loc.name.clone(),
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_requires_version_directive() {
        let err = compile("void main() {}").unwrap_err();
        assert!(err.contains("#version"));
    }

    #[test]
    fn compile_reports_unbalanced_braces_with_line() {
        let err = compile("#version 330 core\nvoid main()\n{\n").unwrap_err();
        assert!(err.starts_with("0:3(1)"), "{err}");
    }

    #[test]
    fn compile_collects_interface() {
        let iface = compile(
            "#version 330 core\n\
             layout (location = 0) in vec3 aPos;\n\
             out vec3 ourColor;\n\
             uniform float uTime;\n\
             void main() {}\n",
        )
        .unwrap();
        assert_eq!(iface.inputs, vec!["aPos"]);
        assert_eq!(iface.outputs, vec!["ourColor"]);
        assert_eq!(iface.uniforms, vec!["uTime"]);
    }

    #[test]
    fn link_rejects_unmatched_varying() {
        let vs = Interface {
            outputs: vec!["a".into()],
            ..Default::default()
        };
        let fs = Interface {
            inputs: vec!["b".into()],
            ..Default::default()
        };
        assert!(link(&vs, &fs).unwrap_err().contains("`b'"));
    }

    #[test]
    fn draw_without_program_or_vertex_array_is_an_error() {
        let gl = SoftGl::default();
        gl.draw_triangles(0, 3);
        assert_eq!(gl.take_error(), Some(INVALID_OPERATION));

        let program = gl.linked_program();
        gl.use_program(Some(program));
        gl.draw_triangles(0, 3);
        assert_eq!(gl.take_error(), Some(INVALID_OPERATION));
        assert!(gl.draws().is_empty());
    }

    #[test]
    fn draw_past_the_end_of_the_buffer_is_an_error() {
        let gl = SoftGl::default();
        let vao = gl.create_vertex_array().unwrap();
        let vbo = gl.create_buffer().unwrap();
        gl.bind_vertex_array(Some(vao));
        gl.bind_array_buffer(Some(vbo));
        gl.array_buffer_data(&[0; 36]);
        gl.vertex_attrib_pointer_f32(0, 3, 12, 0);
        gl.enable_vertex_attrib_array(0);

        let program = gl.linked_program();
        gl.use_program(Some(program));
        gl.draw_triangles(0, 3);
        assert_eq!(gl.take_error(), None);
        gl.draw_triangles(0, 4);
        assert_eq!(gl.take_error(), Some(INVALID_OPERATION));
        let draws = gl.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vao, vao);
    }
}
