//! A Type 2 charstring interpreter.
//!
//! Used to recover advance widths and bounding boxes of glyphs in an existing CFF.

use crate::{BBox, OutlineBuilder};
use crate::parser::{Fixed, Stream};
use super::{CFFError, IsEven, StringId, calc_subroutine_bias, conv_subroutine_index};
use super::argstack::ArgumentsStack;
use super::charset::{Charset, STANDARD_ENCODING};
use super::index::DataIndex;

// Limits according to the Adobe Technical Note #5177 Appendix B.
const STACK_LIMIT: u8 = 10;
const MAX_ARGUMENTS_STACK_LEN: usize = 48;

const TWO_BYTE_OPERATOR_MARK: u8 = 12;

/// Enumerates some operators defined in the Adobe Technical Note #5177.
mod operator {
    pub const HORIZONTAL_STEM: u8           = 1;
    pub const VERTICAL_STEM: u8             = 3;
    pub const VERTICAL_MOVE_TO: u8          = 4;
    pub const LINE_TO: u8                   = 5;
    pub const HORIZONTAL_LINE_TO: u8        = 6;
    pub const VERTICAL_LINE_TO: u8          = 7;
    pub const CURVE_TO: u8                  = 8;
    pub const CALL_LOCAL_SUBROUTINE: u8     = 10;
    pub const RETURN: u8                    = 11;
    pub const ENDCHAR: u8                   = 14;
    pub const HORIZONTAL_STEM_HINT_MASK: u8 = 18;
    pub const HINT_MASK: u8                 = 19;
    pub const COUNTER_MASK: u8              = 20;
    pub const MOVE_TO: u8                   = 21;
    pub const HORIZONTAL_MOVE_TO: u8        = 22;
    pub const VERTICAL_STEM_HINT_MASK: u8   = 23;
    pub const CURVE_LINE: u8                = 24;
    pub const LINE_CURVE: u8                = 25;
    pub const VV_CURVE_TO: u8               = 26;
    pub const HH_CURVE_TO: u8               = 27;
    pub const SHORT_INT: u8                 = 28;
    pub const CALL_GLOBAL_SUBROUTINE: u8    = 29;
    pub const VH_CURVE_TO: u8               = 30;
    pub const HV_CURVE_TO: u8               = 31;
    pub const HFLEX: u8                     = 34;
    pub const FLEX: u8                      = 35;
    pub const HFLEX1: u8                    = 36;
    pub const FLEX1: u8                     = 37;
    pub const FIXED_16_16: u8               = 255;
}


/// Font-level data a charstring may refer to.
pub(crate) struct CharStringContext<'a> {
    pub global_subrs: DataIndex<'a>,
    pub local_subrs: Option<DataIndex<'a>>,
    pub char_strings: DataIndex<'a>,
    pub charset: Charset<'a>,
}

/// What the interpreter learned about a glyph.
#[derive(Clone, Copy, Debug)]
pub struct CharStringInfo {
    /// The width operand, if present. Still relative to `nominalWidthX`.
    pub width: Option<f32>,
    /// Bounding box of all points visited, control points included.
    pub bbox: BBox,
}

struct Builder<'a> {
    builder: &'a mut dyn OutlineBuilder,
    bbox: BBox,
}

impl<'a> Builder<'a> {
    #[inline]
    fn move_to(&mut self, x: f32, y: f32) {
        self.bbox.extend_by(f64::from(x), f64::from(y));
        self.builder.move_to(x, y);
    }

    #[inline]
    fn line_to(&mut self, x: f32, y: f32) {
        self.bbox.extend_by(f64::from(x), f64::from(y));
        self.builder.line_to(x, y);
    }

    #[inline]
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.bbox.extend_by(f64::from(x1), f64::from(y1));
        self.bbox.extend_by(f64::from(x2), f64::from(y2));
        self.bbox.extend_by(f64::from(x), f64::from(y));
        self.builder.curve_to(x1, y1, x2, y2, x, y);
    }

    #[inline]
    fn close(&mut self) {
        self.builder.close();
    }
}

struct ParserState {
    width: Option<f32>,
    width_parsed: bool,
    stems_len: u32,
    has_endchar: bool,
    has_seac: bool,
    has_move_to: bool,
    is_first_move_to: bool,
    x: f32,
    y: f32,
}

impl ParserState {
    // The first odd operand of the first stack-clearing operator is a width.
    #[inline]
    fn take_width(&mut self, stack: &ArgumentsStack) {
        if !self.width_parsed {
            self.width_parsed = true;
            if !stack.is_empty() {
                self.width = Some(stack.at(0));
            }
        }
    }
}


/// Interprets a charstring, forwarding the outline to `builder`.
pub(crate) fn parse_char_string(
    ctx: &CharStringContext,
    data: &[u8],
    builder: &mut dyn OutlineBuilder,
) -> Result<CharStringInfo, CFFError> {
    let mut inner_builder = Builder {
        builder,
        bbox: BBox::new(),
    };

    let mut stack_data = [0.0; MAX_ARGUMENTS_STACK_LEN]; // 192B
    let mut stack = ArgumentsStack {
        data: &mut stack_data,
        len: 0,
        max_len: MAX_ARGUMENTS_STACK_LEN,
    };

    let mut state = ParserState {
        width: None,
        width_parsed: false,
        stems_len: 0,
        has_endchar: false,
        has_seac: false,
        has_move_to: false,
        is_first_move_to: true,
        x: 0.0,
        y: 0.0,
    };

    _parse_char_string(ctx, &mut state, data, 0, &mut stack, &mut inner_builder)?;

    if !state.has_endchar {
        return Err(CFFError::MissingEndChar);
    }

    Ok(CharStringInfo {
        width: state.width,
        bbox: inner_builder.bbox,
    })
}

fn _parse_char_string(
    ctx: &CharStringContext,
    st: &mut ParserState,
    char_string: &[u8],
    depth: u8,
    stack: &mut ArgumentsStack,
    builder: &mut Builder,
) -> Result<(), CFFError> {
    let mut s = Stream::new(char_string);
    while !s.at_end() {
        let op: u8 = s.read().ok_or(CFFError::ReadOutOfBounds)?;
        match op {
            0 | 2 | 9 | 13 | 15 | 16 | 17 => {
                // Reserved.
                return Err(CFFError::InvalidOperator);
            }
            operator::HORIZONTAL_STEM |
            operator::VERTICAL_STEM |
            operator::HORIZONTAL_STEM_HINT_MASK |
            operator::VERTICAL_STEM_HINT_MASK => {
                // y dy {dya dyb}* hstem
                // x dx {dxa dxb}* vstem
                // y dy {dya dyb}* hstemhm
                // x dx {dxa dxb}* vstemhm

                // If the stack length is uneven, than the first value is a `width`.
                let len = if stack.len().is_odd() && !st.width_parsed {
                    st.take_width(stack);
                    stack.len() - 1
                } else {
                    stack.len()
                };

                st.stems_len += len as u32 >> 1;

                // We are ignoring the hint operators.
                stack.clear();
            }
            operator::VERTICAL_MOVE_TO => {
                // dy1

                let mut i = 0;
                if stack.len() == 2 && !st.width_parsed {
                    st.take_width(stack);
                    i += 1;
                } else if stack.len() != 1 {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                begin_contour(st, builder);
                st.y += stack.at(i);
                builder.move_to(st.x, st.y);

                stack.clear();
            }
            operator::LINE_TO => {
                // {dxa dya}+

                if !st.has_move_to {
                    return Err(CFFError::MissingMoveTo);
                }

                if stack.len().is_odd() {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                let mut i = 0;
                while i < stack.len() {
                    st.x += stack.at(i + 0);
                    st.y += stack.at(i + 1);
                    builder.line_to(st.x, st.y);
                    i += 2;
                }

                stack.clear();
            }
            operator::HORIZONTAL_LINE_TO |
            operator::VERTICAL_LINE_TO => {
                // dx1 {dya dxb}*
                //     {dxa dyb}+
                // dy1 {dxa dyb}*
                //     {dya dxb}+

                if !st.has_move_to {
                    return Err(CFFError::MissingMoveTo);
                }

                if stack.is_empty() {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                let mut horizontal = op == operator::HORIZONTAL_LINE_TO;
                for i in 0..stack.len() {
                    if horizontal {
                        st.x += stack.at(i);
                    } else {
                        st.y += stack.at(i);
                    }

                    builder.line_to(st.x, st.y);
                    horizontal = !horizontal;
                }

                stack.clear();
            }
            operator::CURVE_TO => {
                // {dxa dya dxb dyb dxc dyc}+

                if !st.has_move_to {
                    return Err(CFFError::MissingMoveTo);
                }

                if stack.len() % 6 != 0 {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                let mut i = 0;
                while i < stack.len() {
                    curve_rel(st, builder, stack, i);
                    i += 6;
                }

                stack.clear();
            }
            operator::CALL_LOCAL_SUBROUTINE => {
                if stack.is_empty() {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                if depth == STACK_LIMIT {
                    return Err(CFFError::NestingLimitReached);
                }

                let local_subrs = ctx.local_subrs.ok_or(CFFError::NoLocalSubroutines)?;
                let subroutine_bias = calc_subroutine_bias(local_subrs.len());
                let index = conv_subroutine_index(stack.pop(), subroutine_bias)?;
                let char_string = local_subrs.get(index).ok_or(CFFError::InvalidSubroutineIndex)?;
                _parse_char_string(ctx, st, char_string, depth + 1, stack, builder)?;

                if st.has_endchar && !st.has_seac {
                    if !s.at_end() {
                        return Err(CFFError::DataAfterEndChar);
                    }

                    break;
                }
            }
            operator::RETURN => {
                break;
            }
            TWO_BYTE_OPERATOR_MARK => {
                // flex
                let op2: u8 = s.read().ok_or(CFFError::ReadOutOfBounds)?;
                parse_flex(op2, st, stack, builder)?;
            }
            operator::ENDCHAR => {
                if stack.len() == 4 || (!st.width_parsed && stack.len() == 5) {
                    // Process 'seac'.
                    let accent_char = seac_code_to_glyph_id(&ctx.charset, stack.pop())
                        .ok_or(CFFError::InvalidSeacCode)?;
                    let base_char = seac_code_to_glyph_id(&ctx.charset, stack.pop())
                        .ok_or(CFFError::InvalidSeacCode)?;
                    let dy = stack.pop();
                    let dx = stack.pop();

                    if !st.width_parsed {
                        st.take_width(stack);
                        stack.pop();
                    }

                    st.has_seac = true;

                    let base_char_string = ctx.char_strings.get(u32::from(base_char))
                        .ok_or(CFFError::InvalidSeacCode)?;
                    _parse_char_string(ctx, st, base_char_string, depth + 1, stack, builder)?;
                    st.x = dx;
                    st.y = dy;

                    let accent_char_string = ctx.char_strings.get(u32::from(accent_char))
                        .ok_or(CFFError::InvalidSeacCode)?;
                    _parse_char_string(ctx, st, accent_char_string, depth + 1, stack, builder)?;
                } else if stack.len() == 1 && !st.width_parsed {
                    st.take_width(stack);
                    stack.pop();
                }

                if !st.is_first_move_to {
                    st.is_first_move_to = true;
                    builder.close();
                }

                if !s.at_end() {
                    return Err(CFFError::DataAfterEndChar);
                }

                st.has_endchar = true;

                break;
            }
            operator::HINT_MASK | operator::COUNTER_MASK => {
                let mut len = stack.len();

                // If the stack length is uneven, than the first value is a `width`.
                if len.is_odd() && !st.width_parsed {
                    st.take_width(stack);
                    len -= 1;
                }

                // We are ignoring the hint operators.
                stack.clear();

                st.stems_len += len as u32 >> 1;

                s.advance(((st.stems_len + 7) >> 3) as usize);
            }
            operator::MOVE_TO => {
                // dx1 dy1

                let mut i = 0;
                if stack.len() == 3 && !st.width_parsed {
                    st.take_width(stack);
                    i += 1;
                } else if stack.len() != 2 {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                begin_contour(st, builder);
                st.x += stack.at(i + 0);
                st.y += stack.at(i + 1);
                builder.move_to(st.x, st.y);

                stack.clear();
            }
            operator::HORIZONTAL_MOVE_TO => {
                // dx1

                let mut i = 0;
                if stack.len() == 2 && !st.width_parsed {
                    st.take_width(stack);
                    i += 1;
                } else if stack.len() != 1 {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                begin_contour(st, builder);
                st.x += stack.at(i);
                builder.move_to(st.x, st.y);

                stack.clear();
            }
            operator::CURVE_LINE => {
                // {dxa dya dxb dyb dxc dyc}+ dxd dyd

                if !st.has_move_to {
                    return Err(CFFError::MissingMoveTo);
                }

                if stack.len() < 8 || (stack.len() - 2) % 6 != 0 {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                let mut i = 0;
                while i < stack.len() - 2 {
                    curve_rel(st, builder, stack, i);
                    i += 6;
                }

                st.x += stack.at(i + 0);
                st.y += stack.at(i + 1);
                builder.line_to(st.x, st.y);

                stack.clear();
            }
            operator::LINE_CURVE => {
                // {dxa dya}+ dxb dyb dxc dyc dxd dyd

                if !st.has_move_to {
                    return Err(CFFError::MissingMoveTo);
                }

                if stack.len() < 8 || (stack.len() - 6).is_odd() {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                let mut i = 0;
                while i < stack.len() - 6 {
                    st.x += stack.at(i + 0);
                    st.y += stack.at(i + 1);
                    builder.line_to(st.x, st.y);
                    i += 2;
                }

                curve_rel(st, builder, stack, i);

                stack.clear();
            }
            operator::VV_CURVE_TO => {
                // dx1? {dya dxb dyb dyc}+

                if !st.has_move_to {
                    return Err(CFFError::MissingMoveTo);
                }

                let mut i = 0;

                // The odd argument count indicates an X position.
                if stack.len().is_odd() {
                    st.x += stack.at(0);
                    i += 1;
                }

                if (stack.len() - i) % 4 != 0 {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                while i < stack.len() {
                    let x1 = st.x;
                    let y1 = st.y + stack.at(i + 0);
                    let x2 = x1 + stack.at(i + 1);
                    let y2 = y1 + stack.at(i + 2);
                    st.x = x2;
                    st.y = y2 + stack.at(i + 3);

                    builder.curve_to(x1, y1, x2, y2, st.x, st.y);
                    i += 4;
                }

                stack.clear();
            }
            operator::HH_CURVE_TO => {
                // dy1? {dxa dxb dyb dxc}+

                if !st.has_move_to {
                    return Err(CFFError::MissingMoveTo);
                }

                let mut i = 0;

                // The odd argument count indicates an Y position.
                if stack.len().is_odd() {
                    st.y += stack.at(0);
                    i += 1;
                }

                if (stack.len() - i) % 4 != 0 {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                while i < stack.len() {
                    let x1 = st.x + stack.at(i + 0);
                    let y1 = st.y;
                    let x2 = x1 + stack.at(i + 1);
                    let y2 = y1 + stack.at(i + 2);
                    st.x = x2 + stack.at(i + 3);
                    st.y = y2;

                    builder.curve_to(x1, y1, x2, y2, st.x, st.y);
                    i += 4;
                }

                stack.clear();
            }
            operator::SHORT_INT => {
                let n = s.read::<i16>().ok_or(CFFError::ReadOutOfBounds)?;
                stack.push(f32::from(n))?;
            }
            operator::CALL_GLOBAL_SUBROUTINE => {
                if stack.is_empty() {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                if depth == STACK_LIMIT {
                    return Err(CFFError::NestingLimitReached);
                }

                let subroutine_bias = calc_subroutine_bias(ctx.global_subrs.len());
                let index = conv_subroutine_index(stack.pop(), subroutine_bias)?;
                let char_string = ctx.global_subrs.get(index)
                    .ok_or(CFFError::InvalidSubroutineIndex)?;
                _parse_char_string(ctx, st, char_string, depth + 1, stack, builder)?;

                if st.has_endchar && !st.has_seac {
                    if !s.at_end() {
                        return Err(CFFError::DataAfterEndChar);
                    }

                    break;
                }
            }
            operator::VH_CURVE_TO | operator::HV_CURVE_TO => {
                // dy1 dx2 dy2 dx3 {dxa dxb dyb dyc dyd dxe dye dxf}* dyf?
                //                 {dya dxb dyb dxc dxd dxe dye dyf}+ dxf?
                // dx1 dx2 dy2 dy3 {dya dxb dyb dxc dxd dxe dye dyf}* dxf?
                //                 {dxa dxb dyb dyc dyd dxe dye dxf}+ dyf?

                if !st.has_move_to {
                    return Err(CFFError::MissingMoveTo);
                }

                if stack.len() < 4 {
                    return Err(CFFError::InvalidArgumentsStackLength);
                }

                let mut vertical = op == operator::VH_CURVE_TO;
                stack.reverse();
                while !stack.is_empty() {
                    if stack.len() < 4 {
                        return Err(CFFError::InvalidArgumentsStackLength);
                    }

                    if vertical {
                        let x1 = st.x;
                        let y1 = st.y + stack.pop();
                        let x2 = x1 + stack.pop();
                        let y2 = y1 + stack.pop();
                        st.x = x2 + stack.pop();
                        st.y = y2 + if stack.len() == 1 { stack.pop() } else { 0.0 };
                        builder.curve_to(x1, y1, x2, y2, st.x, st.y);
                    } else {
                        let x1 = st.x + stack.pop();
                        let y1 = st.y;
                        let x2 = x1 + stack.pop();
                        let y2 = y1 + stack.pop();
                        st.y = y2 + stack.pop();
                        st.x = x2 + if stack.len() == 1 { stack.pop() } else { 0.0 };
                        builder.curve_to(x1, y1, x2, y2, st.x, st.y);
                    }

                    vertical = !vertical;
                }
            }
            32..=246 => {
                let n = i16::from(op) - 139;
                stack.push(f32::from(n))?;
            }
            247..=250 => {
                let b1: u8 = s.read().ok_or(CFFError::ReadOutOfBounds)?;
                let n = (i16::from(op) - 247) * 256 + i16::from(b1) + 108;
                stack.push(f32::from(n))?;
            }
            251..=254 => {
                let b1: u8 = s.read().ok_or(CFFError::ReadOutOfBounds)?;
                let n = -(i16::from(op) - 251) * 256 - i16::from(b1) - 108;
                stack.push(f32::from(n))?;
            }
            operator::FIXED_16_16 => {
                let n = s.read::<Fixed>().ok_or(CFFError::ReadOutOfBounds)?;
                stack.push(n.0)?;
            }
        }
    }

    Ok(())
}

#[inline]
fn begin_contour(st: &mut ParserState, builder: &mut Builder) {
    if st.is_first_move_to {
        st.is_first_move_to = false;
    } else {
        builder.close();
    }

    st.has_move_to = true;
}

#[inline]
fn curve_rel(st: &mut ParserState, builder: &mut Builder, stack: &ArgumentsStack, i: usize) {
    let x1 = st.x + stack.at(i + 0);
    let y1 = st.y + stack.at(i + 1);
    let x2 = x1 + stack.at(i + 2);
    let y2 = y1 + stack.at(i + 3);
    st.x = x2 + stack.at(i + 4);
    st.y = y2 + stack.at(i + 5);
    builder.curve_to(x1, y1, x2, y2, st.x, st.y);
}

fn parse_flex(
    op2: u8,
    st: &mut ParserState,
    stack: &mut ArgumentsStack,
    builder: &mut Builder,
) -> Result<(), CFFError> {
    if !st.has_move_to {
        return Err(CFFError::MissingMoveTo);
    }

    let (x, y) = (st.x, st.y);
    match op2 {
        operator::HFLEX => {
            // dx1 dx2 dy2 dx3 dx4 dx5 dx6

            if stack.len() != 7 {
                return Err(CFFError::InvalidArgumentsStackLength);
            }

            let dx1 = x + stack.at(0);
            let dy1 = y;
            let dx2 = dx1 + stack.at(1);
            let dy2 = dy1 + stack.at(2);
            let dx3 = dx2 + stack.at(3);
            let dy3 = dy2;
            let dx4 = dx3 + stack.at(4);
            let dy4 = dy2;
            let dx5 = dx4 + stack.at(5);
            let dy5 = y;
            st.x = dx5 + stack.at(6);
            builder.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
            builder.curve_to(dx4, dy4, dx5, dy5, st.x, st.y);
        }
        operator::FLEX => {
            // dx1 dy1 dx2 dy2 dx3 dy3 dx4 dy4 dx5 dy5 dx6 dy6 fd

            if stack.len() != 13 {
                return Err(CFFError::InvalidArgumentsStackLength);
            }

            let dx1 = x + stack.at(0);
            let dy1 = y + stack.at(1);
            let dx2 = dx1 + stack.at(2);
            let dy2 = dy1 + stack.at(3);
            let dx3 = dx2 + stack.at(4);
            let dy3 = dy2 + stack.at(5);
            let dx4 = dx3 + stack.at(6);
            let dy4 = dy3 + stack.at(7);
            let dx5 = dx4 + stack.at(8);
            let dy5 = dy4 + stack.at(9);
            st.x = dx5 + stack.at(10);
            st.y = dy5 + stack.at(11);
            builder.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
            builder.curve_to(dx4, dy4, dx5, dy5, st.x, st.y);
        }
        operator::HFLEX1 => {
            // dx1 dy1 dx2 dy2 dx3 dx4 dx5 dy5 dx6

            if stack.len() != 9 {
                return Err(CFFError::InvalidArgumentsStackLength);
            }

            let dx1 = x + stack.at(0);
            let dy1 = y + stack.at(1);
            let dx2 = dx1 + stack.at(2);
            let dy2 = dy1 + stack.at(3);
            let dx3 = dx2 + stack.at(4);
            let dy3 = dy2;
            let dx4 = dx3 + stack.at(5);
            let dy4 = dy2;
            let dx5 = dx4 + stack.at(6);
            let dy5 = dy4 + stack.at(7);
            st.x = dx5 + stack.at(8);
            builder.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
            builder.curve_to(dx4, dy4, dx5, dy5, st.x, st.y);
        }
        operator::FLEX1 => {
            // dx1 dy1 dx2 dy2 dx3 dy3 dx4 dy4 dx5 dy5 d6

            if stack.len() != 11 {
                return Err(CFFError::InvalidArgumentsStackLength);
            }

            let dx1 = x + stack.at(0);
            let dy1 = y + stack.at(1);
            let dx2 = dx1 + stack.at(2);
            let dy2 = dy1 + stack.at(3);
            let dx3 = dx2 + stack.at(4);
            let dy3 = dy2 + stack.at(5);
            let dx4 = dx3 + stack.at(6);
            let dy4 = dy3 + stack.at(7);
            let dx5 = dx4 + stack.at(8);
            let dy5 = dy4 + stack.at(9);

            if (dx5 - x).abs() > (dy5 - y).abs() {
                st.x = dx5 + stack.at(10);
            } else {
                st.y = dy5 + stack.at(10);
            }

            builder.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
            builder.curve_to(dx4, dy4, dx5, dy5, st.x, st.y);
        }
        _ => {
            return Err(CFFError::UnsupportedOperator);
        }
    }

    stack.clear();
    Ok(())
}

fn seac_code_to_glyph_id(charset: &Charset, n: f32) -> Option<u16> {
    if !(0.0..=255.0).contains(&n) {
        return None;
    }

    let code = n as u8;
    let sid = STANDARD_ENCODING[usize::from(code)];
    let sid = StringId(u16::from(sid));

    match charset {
        Charset::ISOAdobe => {
            // Not sure why code should be less than 228/zcaron, but this is what harfbuzz does.
            if code < 228 { Some(sid.0) } else { None }
        }
        Charset::Expert | Charset::ExpertSubset => None,
        _ => charset.sid_to_gid(sid),
    }
}
